//! バイナリ辞書の書き出し
//!
//! このモジュールは、準備済みのレコード列からバイナリ辞書アーティファクトを
//! 構築するビルダーを提供します。JMdictの解析・活用展開・コスト計算は
//! 外部のビルドパイプラインの責務であり、ここではフォーマットの
//! シリアライズのみを扱います。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::dictionary::trie::Trie;
use crate::dictionary::{WordEntry, DICTIONARY_MAGIC, FORMAT_VERSION, POS_TABLE, RECORD_SIZE};
use crate::errors::{HimotokiError, Result};

const FLAG_HAS_POS_TABLE: u32 = 1;
const HEADER_LEN: usize = 0x2C;

/// バイナリ辞書を構築するビルダー
///
/// キーはソートされて格納され、同一の表層形に対するレコードは
/// 挿入順を保ちます。
///
/// # 例
///
/// ```
/// use himotoki::dictionary::{Dictionary, DictionaryBuilder, WordEntry};
///
/// let mut builder = DictionaryBuilder::new();
/// builder.push(
///     "天気",
///     WordEntry { seq: 1438690, cost: 10, pos_id: 1, conj_type: 0, base_seq: 1438690 },
/// );
/// let dict = Dictionary::from_bytes(builder.build()?)?;
/// assert_eq!(dict.num_entries(), 1);
/// # Ok::<(), himotoki::HimotokiError>(())
/// ```
#[derive(Default)]
pub struct DictionaryBuilder {
    entries: BTreeMap<String, Vec<WordEntry>>,
}

impl DictionaryBuilder {
    /// 新しい空のビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 表層形とレコードのペアを追加します。
    pub fn push<S>(&mut self, surface: S, entry: WordEntry)
    where
        S: Into<String>,
    {
        self.entries.entry(surface.into()).or_default().push(entry);
    }

    /// 辞書をバイト列にシリアライズします。
    ///
    /// # エラー
    ///
    /// レコードが1件も追加されていない場合は
    /// [`HimotokiError::InvalidArgument`]を返します。
    pub fn build(&self) -> Result<Vec<u8>> {
        if self.entries.is_empty() {
            return Err(HimotokiError::invalid_argument(
                "entries",
                "cannot build an empty dictionary",
            ));
        }

        // Assign record indices in key order, records per key in insertion
        // order. Trie values are word offsets into the postings area.
        let mut keys = Vec::with_capacity(self.entries.len());
        let mut postings: Vec<u32> = vec![];
        let mut records: Vec<&WordEntry> = vec![];
        for (surface, group) in &self.entries {
            keys.push((surface.as_str(), u32::try_from(postings.len())?));
            postings.push(u32::try_from(group.len())?);
            for entry in group {
                postings.push(u32::try_from(records.len())?);
                records.push(entry);
            }
        }

        let da_bytes = Trie::from_records(&keys)?.serialize_to_vec();

        let pos_table = encode_pos_table();
        let pos_table_off = HEADER_LEN;
        let trie_off = pos_table_off + pos_table.len();
        let trie_len = 4 + da_bytes.len() + 4 + postings.len() * 4 + 4 + records.len() * RECORD_SIZE;

        let mut out = Vec::with_capacity(trie_off + trie_len);
        out.extend_from_slice(DICTIONARY_MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&FLAG_HAS_POS_TABLE.to_le_bytes());
        out.extend_from_slice(&(RECORD_SIZE as u32).to_le_bytes());
        out.extend_from_slice(&(pos_table_off as u64).to_le_bytes());
        out.extend_from_slice(&(trie_off as u64).to_le_bytes());
        out.extend_from_slice(&(trie_len as u64).to_le_bytes());
        debug_assert_eq!(out.len(), HEADER_LEN);

        out.extend_from_slice(&pos_table);

        out.extend_from_slice(&u32::try_from(da_bytes.len())?.to_le_bytes());
        out.extend_from_slice(&da_bytes);
        out.extend_from_slice(&u32::try_from(postings.len())?.to_le_bytes());
        for v in &postings {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&u32::try_from(records.len())?.to_le_bytes());
        for record in records {
            record.encode(&mut out);
        }
        debug_assert_eq!(out.len(), trie_off + trie_len);

        Ok(out)
    }

    /// 辞書をシリアライズしてファイルに書き出します。
    pub fn write_to_path<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let bytes = self.build()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// 品詞テーブルをシリアライズします。
///
/// テーブルは品詞IDでインデックスされるため、未割り当てIDの位置には
/// 空文字列が入ります。
fn encode_pos_table() -> Vec<u8> {
    let max_id = POS_TABLE.last().map(|&(id, _)| id).unwrap_or(0);
    let count = usize::from(max_id) + 1;
    let mut names = vec![""; count];
    for &(id, name) in POS_TABLE {
        names[usize::from(id)] = name;
    }

    let mut out = vec![];
    out.extend_from_slice(&(count as u16).to_le_bytes());
    for name in names {
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;

    #[test]
    fn test_empty_builder_fails() {
        let err = DictionaryBuilder::new().build().unwrap_err();
        assert!(matches!(err, HimotokiError::InvalidArgument(_)));
    }

    #[test]
    fn test_write_to_path() {
        let mut builder = DictionaryBuilder::new();
        builder.push(
            "力",
            WordEntry {
                seq: 1554820,
                cost: 8,
                pos_id: 1,
                conj_type: 0,
                base_seq: 1554820,
            },
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("built.dic");
        builder.write_to_path(&path).unwrap();

        let dict = Dictionary::from_path(&path).unwrap();
        let suffix: Vec<char> = "力を".chars().collect();
        let matches: Vec<_> = dict.common_prefix_iterator(&suffix).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].end_char, 1);
        assert_eq!(dict.pos_name(matches[0].entry.pos_id), "n");
    }
}
