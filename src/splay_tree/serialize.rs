//! Serde support.
//!
//! A tree is encoded as the sequence of its keys in pre-order. Decoding rebuilds the exact shape
//! that was encoded in linear time and rejects sequences that are not the pre-order of a search
//! tree.

use crate::splay_tree::tree::{PreOrderBuilder, SplayTree};
use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

impl<T> Serialize for SplayTree<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.pre_order())
    }
}

struct SplayTreeVisitor<T> {
    marker: PhantomData<fn() -> SplayTree<T>>,
}

impl<'de, T> Visitor<'de> for SplayTreeVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = SplayTree<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of distinct keys in pre-order")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut builder = PreOrderBuilder::new();
        while let Some(key) = seq.next_element()? {
            builder.push(key).map_err(<A::Error as de::Error>::custom)?;
        }
        Ok(builder.finish())
    }
}

impl<'de, T> Deserialize<'de> for SplayTree<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SplayTreeVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::splay_tree::SplayTree;
    use serde_test::{assert_de_tokens_error, assert_ser_tokens, Token};

    fn pre_order(tree: &SplayTree<u32>) -> Vec<u32> {
        tree.pre_order().cloned().collect()
    }

    #[test]
    fn test_serialize_pre_order() {
        let tree: SplayTree<u32> = SplayTree::from_keys(vec![2, 1, 3]).unwrap();
        // 3 is splayed last, leaving 2 and 1 on its left spine.
        assert_ser_tokens(
            &tree,
            &[
                Token::Seq { len: Some(3) },
                Token::U32(3),
                Token::U32(2),
                Token::U32(1),
                Token::SeqEnd,
            ],
        );
    }

    #[test]
    fn test_serialize_empty() {
        let tree: SplayTree<u32> = SplayTree::new();
        assert_ser_tokens(&tree, &[Token::Seq { len: Some(0) }, Token::SeqEnd]);
    }

    #[test]
    fn test_deserialize_duplicate_key() {
        assert_de_tokens_error::<SplayTree<u32>>(
            &[
                Token::Seq { len: Some(2) },
                Token::U32(1),
                Token::U32(1),
                Token::SeqEnd,
            ],
            "duplicate key in splay tree sequence",
        );
    }

    #[test]
    fn test_deserialize_not_pre_order() {
        assert_de_tokens_error::<SplayTree<u32>>(
            &[
                Token::Seq { len: Some(3) },
                Token::U32(2),
                Token::U32(3),
                Token::U32(1),
                Token::SeqEnd,
            ],
            "splay tree keys are not in pre-order",
        );
    }

    #[test]
    fn test_bincode_deep_chain() {
        let mut tree = SplayTree::new();
        for key in 0..150_000u32 {
            tree.add(key);
        }
        let encoded = bincode::serialize(&tree).unwrap();
        let decoded: SplayTree<u32> = bincode::deserialize(&encoded).unwrap();

        assert_eq!(decoded.len(), 150_000);
        assert_eq!(pre_order(&decoded), pre_order(&tree));
        assert_eq!(decoded.min(), Some(&0));
    }

    #[test]
    fn test_bincode_preserves_shape() {
        let mut tree = SplayTree::from_keys(vec![50, 20, 80, 10, 30, 70, 90]).unwrap();
        tree.find(&30).unwrap();
        let encoded = bincode::serialize(&tree).unwrap();
        let decoded: SplayTree<u32> = bincode::deserialize(&encoded).unwrap();

        assert_eq!(pre_order(&decoded), pre_order(&tree));
        assert_eq!(decoded.len(), 7);
        assert_eq!(decoded.root().map(|node| *node.key()), Some(30));
    }
}
