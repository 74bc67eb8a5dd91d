//! ダブル配列トライによる表層形の前方一致検索
//!
//! このモジュールは、crawdadのダブル配列トライの薄いラッパーを提供します。

use crate::errors::{HimotokiError, Result};

/// ダブル配列トライ
pub(crate) struct Trie {
    da: crawdad::Trie,
}

impl std::fmt::Debug for Trie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trie").finish_non_exhaustive()
    }
}

impl Trie {
    /// キーと値のペアからトライを構築します。
    ///
    /// キーはソート済みかつ一意でなければなりません。
    pub fn from_records<K>(records: &[(K, u32)]) -> Result<Self>
    where
        K: AsRef<str>,
    {
        Ok(Self {
            da: crawdad::Trie::from_records(records.iter().map(|(k, v)| (k, *v)))
                .map_err(|e| HimotokiError::invalid_argument("records", e.to_string()))?,
        })
    }

    /// 共通接頭辞検索のイテレータを取得します。
    ///
    /// `end_char`は入力スライス先頭からの文字数です。
    #[inline(always)]
    pub fn common_prefix_iterator<'a>(
        &'a self,
        input: &'a [char],
    ) -> impl Iterator<Item = TrieMatch> + 'a {
        self.da
            .common_prefix_search(input.iter().cloned())
            .map(move |(value, end_char)| TrieMatch::new(value, end_char))
    }

    /// トライをバイト列にシリアライズします。
    pub fn serialize_to_vec(&self) -> Vec<u8> {
        self.da.serialize_to_vec()
    }

    /// バイト列からトライを復元します。
    ///
    /// スライスは[`serialize_to_vec`]が出力したバイト列そのものである
    /// 必要があります。
    ///
    /// [`serialize_to_vec`]: Self::serialize_to_vec
    pub fn deserialize_from_slice(bytes: &[u8]) -> Self {
        let (da, _rest) = crawdad::Trie::deserialize_from_slice(bytes);
        Self { da }
    }
}

/// トライマッチング結果
#[derive(Debug, Eq, PartialEq, Clone)]
pub(crate) struct TrieMatch {
    pub value: u32,
    pub end_char: usize,
}

impl TrieMatch {
    #[inline(always)]
    pub const fn new(value: u32, end_char: usize) -> Self {
        Self { value, end_char }
    }
}
