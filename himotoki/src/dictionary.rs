//! トークン化のための辞書モジュール。
//!
//! このモジュールは、形態素解析に必要なバイナリ辞書の読み込みと検索を行います。
//! 辞書ファイルはJMdictから外部ビルダーで構築されたアーティファクトで、
//! 表層形をキーとして固定長12バイトのレコード列を引くダブル配列トライを
//! 格納しています。主な機能:
//!
//! - メモリマップドファイルによる高速な読み込み（[`Dictionary::from_path`]）
//! - オープン時のフォーマット検証（マジック、バージョン、オフセット整合性）
//! - 共通接頭辞検索による候補列挙（[`Dictionary::common_prefix_iterator`]）
//! - 品詞ID から品詞名への変換（[`Dictionary::pos_name`]）
//!
//! オープン後の辞書は読み取り専用であり、複数スレッドから同時に検索しても
//! 安全です。
//!
//! # バイナリフォーマット
//!
//! すべてリトルエンディアン。
//!
//! ```text
//! 0x00  magic         8バイト  "HIMOTKSP"
//! 0x08  version       u32     = 1
//! 0x0C  flags         u32     bit0 = 品詞テーブルあり
//! 0x10  record_size   u32     = 12
//! 0x14  pos_table_off u64
//! 0x1C  trie_off      u64
//! 0x24  trie_len      u64
//! ...   品詞テーブル: u16 件数、各要素は u16 バイト長 + UTF-8
//! ...   トライペイロード: ダブル配列 + ポスティング + レコード列
//! ```

pub mod builder;
pub(crate) mod trie;

use std::fs::File;
use std::io;
use std::ops::Range;
use std::path::Path;

use memmap2::Mmap;

use crate::dictionary::trie::Trie;
use crate::errors::{HimotokiError, Result};

pub use crate::dictionary::builder::DictionaryBuilder;

/// 辞書ファイルを識別するマジックバイト。
pub const DICTIONARY_MAGIC: &[u8; 8] = b"HIMOTKSP";

/// サポートされる辞書フォーマットのバージョン。
pub const FORMAT_VERSION: u32 = 1;

/// 合成された未知語レコードの品詞ID。
pub const UNKNOWN_POS_ID: u8 = 255;

/// 1レコードのバイト数。
pub(crate) const RECORD_SIZE: usize = 12;

const HEADER_LEN: usize = 0x2C;
const FLAG_HAS_POS_TABLE: u32 = 1;

/// 品詞IDと品詞名の対応表。
///
/// JMdictの品詞タグを固定IDに割り当てたものです。IDの割り当ては
/// 辞書フォーマットの一部であり、変更されません。
pub(crate) const POS_TABLE: &[(u8, &str)] = &[
    (1, "n"),
    (2, "n-adv"),
    (3, "n-pref"),
    (4, "n-suf"),
    (5, "n-t"),
    (10, "v1"),
    (11, "v1-s"),
    (12, "v5aru"),
    (13, "v5b"),
    (14, "v5g"),
    (15, "v5k"),
    (16, "v5k-s"),
    (17, "v5m"),
    (18, "v5n"),
    (19, "v5r"),
    (20, "v5r-i"),
    (21, "v5s"),
    (22, "v5t"),
    (23, "v5u"),
    (24, "v5u-s"),
    (25, "v5uru"),
    (26, "vk"),
    (27, "vs"),
    (28, "vs-i"),
    (29, "vs-s"),
    (30, "vz"),
    (40, "adj-i"),
    (41, "adj-ix"),
    (42, "adj-na"),
    (43, "adj-no"),
    (44, "adj-pn"),
    (45, "adj-t"),
    (46, "adj-f"),
    (50, "adv"),
    (51, "adv-to"),
    (60, "aux"),
    (61, "aux-v"),
    (62, "aux-adj"),
    (70, "conj"),
    (71, "cop"),
    (72, "ctr"),
    (73, "exp"),
    (74, "int"),
    (80, "pn"),
    (81, "pref"),
    (82, "prt"),
    (83, "suf"),
    (84, "unc"),
];

/// 辞書に格納される語彙レコード。
///
/// 12バイト固定長でトライのペイロードとして格納されます。
/// 同じ表層形に複数のレコード（同形異義語、活用形）が対応することがあります。
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WordEntry {
    /// JMdictのシーケンスID。
    pub seq: i32,
    /// 事前計算された生起コスト。小さいほど出現しやすい語です。
    pub cost: i16,
    /// 品詞ID（[`Dictionary::pos_name`]で名前に変換できます）。
    pub pos_id: u8,
    /// 活用形タグ。0は辞書形（語幹）を表します。
    pub conj_type: u8,
    /// 辞書形のシーケンスID。辞書形のレコードでは`seq`と一致します。
    pub base_seq: i32,
}

impl WordEntry {
    /// このレコードが辞書形（活用されていない形）であれば`true`を返します。
    #[inline(always)]
    pub const fn is_root(&self) -> bool {
        self.conj_type == 0 && self.base_seq == self.seq
    }

    /// 12バイトのレコードをデコードします。
    #[inline(always)]
    pub(crate) fn decode(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), RECORD_SIZE);
        Self {
            seq: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            cost: i16::from_le_bytes([bytes[4], bytes[5]]),
            pos_id: bytes[6],
            conj_type: bytes[7],
            base_seq: i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        }
    }

    /// レコードを12バイトにエンコードして`out`へ追記します。
    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.seq.to_le_bytes());
        out.extend_from_slice(&self.cost.to_le_bytes());
        out.push(self.pos_id);
        out.push(self.conj_type);
        out.extend_from_slice(&self.base_seq.to_le_bytes());
    }
}

/// 共通接頭辞検索のマッチング結果。
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LexMatch {
    /// マッチした表層形の文字数（入力スライス先頭から）。
    pub end_char: usize,
    /// マッチしたレコード。
    pub entry: WordEntry,
}

/// メモリバッファ（mmapまたはヒープ）を保持するラッパー。
#[derive(Debug)]
enum DictBuffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl DictBuffer {
    #[inline(always)]
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Mmap(m) => m,
            Self::Owned(v) => v,
        }
    }
}

/// トークン化のための読み取り専用辞書。
///
/// [`Dictionary::from_path`]はファイルをメモリマップし、すべてのヘッダと
/// 内部レイアウトをオープン時に検証します。以降の検索は検証済みの
/// データを前提とし、ロックなしで複数スレッドから実行できます。
///
/// # 例
///
/// ```no_run
/// use himotoki::Dictionary;
///
/// let dict = Dictionary::from_path("data/himotoki.dic")?;
/// let suffix: Vec<char> = "今日は".chars().collect();
/// for m in dict.common_prefix_iterator(&suffix) {
///     println!("{} chars, pos={}", m.end_char, dict.pos_name(m.entry.pos_id));
/// }
/// # Ok::<(), himotoki::HimotokiError>(())
/// ```
#[derive(Debug)]
pub struct Dictionary {
    buffer: DictBuffer,
    trie: Trie,
    postings: Vec<u32>,
    records: Range<usize>,
    num_records: u32,
    pos_names: Vec<String>,
}

impl Dictionary {
    /// ファイルパスから辞書を読み込みます。
    ///
    /// ファイルはメモリマップされ、フォーマット全体が検証されます。
    ///
    /// # エラー
    ///
    /// * [`HimotokiError::NotFound`] - ファイルが存在しない場合
    /// * [`HimotokiError::VersionMismatch`] - フォーマットバージョンが非対応の場合
    /// * [`HimotokiError::Corrupt`] - マジック、オフセット、内部レイアウトが不正な場合
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                HimotokiError::NotFound(path.to_path_buf())
            } else {
                HimotokiError::Io(e)
            }
        })?;
        // Safety: the artifact is treated as read-only for the lifetime of
        // the mapping; concurrent external modification is undefined for any
        // mmap-based reader.
        let mmap = unsafe { Mmap::map(&file)? };
        let dict = Self::from_buffer(DictBuffer::Mmap(mmap))?;
        log::debug!(
            "loaded dictionary from {}: {} entries",
            path.display(),
            dict.num_entries()
        );
        Ok(dict)
    }

    /// バイト列から辞書を読み込みます。
    ///
    /// [`from_path`]と同じ検証を行いますが、バッファを所有します。
    /// テストや埋め込みアーティファクトに使用します。
    ///
    /// [`from_path`]: Self::from_path
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_buffer(DictBuffer::Owned(bytes))
    }

    fn from_buffer(buffer: DictBuffer) -> Result<Self> {
        let bytes = buffer.bytes();
        if bytes.len() < HEADER_LEN {
            return Err(HimotokiError::corrupt("file is shorter than the header"));
        }
        if &bytes[..8] != DICTIONARY_MAGIC {
            return Err(HimotokiError::corrupt("bad magic bytes"));
        }
        let version = read_u32(bytes, 0x08);
        if version != FORMAT_VERSION {
            return Err(HimotokiError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: version,
            });
        }
        let flags = read_u32(bytes, 0x0C);
        let record_size = read_u32(bytes, 0x10);
        if record_size as usize != RECORD_SIZE {
            return Err(HimotokiError::corrupt(format!(
                "unexpected record size {record_size}"
            )));
        }
        let pos_table_off = to_offset(read_u64(bytes, 0x14))?;
        let trie_off = to_offset(read_u64(bytes, 0x1C))?;
        let trie_len = to_offset(read_u64(bytes, 0x24))?;
        let trie_end = trie_off
            .checked_add(trie_len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| HimotokiError::corrupt("trie region out of bounds"))?;

        let pos_names = if flags & FLAG_HAS_POS_TABLE != 0 {
            parse_pos_table(bytes, pos_table_off)?
        } else {
            builtin_pos_names()
        };

        // Trie payload: double array, postings, records, each length-prefixed.
        let region = &bytes[trie_off..trie_end];
        let mut cursor = 0usize;
        let da_len = read_region_u32(region, &mut cursor)? as usize;
        if da_len > region.len() - cursor {
            return Err(HimotokiError::corrupt("double array out of bounds"));
        }
        let trie = Trie::deserialize_from_slice(&region[cursor..cursor + da_len]);
        cursor += da_len;

        let postings_len = read_region_u32(region, &mut cursor)? as usize;
        let postings_bytes = postings_len
            .checked_mul(4)
            .filter(|&n| n <= region.len() - cursor)
            .ok_or_else(|| HimotokiError::corrupt("postings out of bounds"))?;
        let mut postings = Vec::with_capacity(postings_len);
        for chunk in region[cursor..cursor + postings_bytes].chunks_exact(4) {
            postings.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        cursor += postings_bytes;

        let num_records = read_region_u32(region, &mut cursor)?;
        let records_bytes = (num_records as usize)
            .checked_mul(RECORD_SIZE)
            .ok_or_else(|| HimotokiError::corrupt("record count overflow"))?;
        if records_bytes != region.len() - cursor {
            return Err(HimotokiError::corrupt(
                "record count is inconsistent with the payload size",
            ));
        }
        let records = trie_off + cursor..trie_end;

        // Every postings group must be well-formed so that lookups can
        // assume validity afterwards.
        let mut i = 0;
        while i < postings.len() {
            let n = postings[i] as usize;
            if i + 1 + n > postings.len() {
                return Err(HimotokiError::corrupt("truncated postings group"));
            }
            if postings[i + 1..i + 1 + n].iter().any(|&id| id >= num_records) {
                return Err(HimotokiError::corrupt("posting refers past the records"));
            }
            i += 1 + n;
        }

        Ok(Self {
            buffer,
            trie,
            postings,
            records,
            num_records,
            pos_names,
        })
    }

    /// `suffix`の接頭辞にマッチするすべてのレコードを列挙します。
    ///
    /// 返される系列は遅延評価され、キーは短い順、同一キー内のレコードは
    /// 挿入順に並びます。マッチの長さは文字数（コードポイント数）です。
    #[inline(always)]
    pub fn common_prefix_iterator<'a>(
        &'a self,
        suffix: &'a [char],
    ) -> impl Iterator<Item = LexMatch> + 'a {
        self.trie.common_prefix_iterator(suffix).flat_map(move |m| {
            self.posting_ids(m.value).map(move |rec_idx| LexMatch {
                end_char: m.end_char,
                entry: self.record(rec_idx),
            })
        })
    }

    #[inline(always)]
    fn posting_ids(&self, group_offset: u32) -> impl Iterator<Item = u32> + '_ {
        let off = group_offset as usize;
        let n = self.postings[off] as usize;
        self.postings[off + 1..off + 1 + n].iter().copied()
    }

    #[inline(always)]
    fn record(&self, idx: u32) -> WordEntry {
        let start = self.records.start + idx as usize * RECORD_SIZE;
        WordEntry::decode(&self.buffer.bytes()[start..start + RECORD_SIZE])
    }

    /// 品詞IDから品詞名を返します。
    ///
    /// 未割り当てのIDおよび未知語IDに対しては`"unk"`を返します。
    #[inline(always)]
    pub fn pos_name(&self, pos_id: u8) -> &str {
        match self.pos_names.get(usize::from(pos_id)) {
            Some(name) if !name.is_empty() => name,
            _ => "unk",
        }
    }

    /// 辞書に格納されているレコードの総数を返します。
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.num_records as usize
    }

    /// 辞書を閉じ、マッピングを解放します。
    ///
    /// ドロップと等価です。所有権が移動するため、閉じた後の検索は
    /// 型システムによって禁止されます。
    pub fn close(self) {}
}

#[inline(always)]
fn read_u32(bytes: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

#[inline(always)]
fn read_u64(bytes: &[u8], off: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[off..off + 8]);
    u64::from_le_bytes(buf)
}

fn to_offset(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| HimotokiError::corrupt("offset does not fit in memory"))
}

fn read_region_u32(region: &[u8], cursor: &mut usize) -> Result<u32> {
    if *cursor + 4 > region.len() {
        return Err(HimotokiError::corrupt("truncated trie payload"));
    }
    let v = read_u32(region, *cursor);
    *cursor += 4;
    Ok(v)
}

fn parse_pos_table(bytes: &[u8], off: usize) -> Result<Vec<String>> {
    if off.checked_add(2).filter(|&end| end <= bytes.len()).is_none() {
        return Err(HimotokiError::corrupt("pos table out of bounds"));
    }
    let count = usize::from(u16::from_le_bytes([bytes[off], bytes[off + 1]]));
    let mut names = Vec::with_capacity(count);
    let mut cursor = off + 2;
    for _ in 0..count {
        if cursor + 2 > bytes.len() {
            return Err(HimotokiError::corrupt("truncated pos table"));
        }
        let len = usize::from(u16::from_le_bytes([bytes[cursor], bytes[cursor + 1]]));
        cursor += 2;
        if cursor + len > bytes.len() {
            return Err(HimotokiError::corrupt("truncated pos table entry"));
        }
        let name = std::str::from_utf8(&bytes[cursor..cursor + len])
            .map_err(|_| HimotokiError::corrupt("pos table entry is not UTF-8"))?;
        names.push(name.to_string());
        cursor += len;
    }
    Ok(names)
}

/// 品詞テーブルを持たない辞書のための組み込みテーブルを返します。
pub(crate) fn builtin_pos_names() -> Vec<String> {
    let max_id = POS_TABLE.last().map(|&(id, _)| id).unwrap_or(0);
    let mut names = vec![String::new(); usize::from(max_id) + 1];
    for &(id, name) in POS_TABLE {
        names[usize::from(id)] = name.to_string();
    }
    names
}
