//! # himotoki
//!
//! himotokiは、軽量な日本語形態素解析（トークン化）の実装です。
//!
//! ## 概要
//!
//! このライブラリは、コンパクトなバイナリ辞書をメモリマップし、
//! ビタビアルゴリズムで日本語テキストを形態素列に分割します。
//! 辞書はJMdictから外部ビルダーで構築されたアーティファクトで、
//! 表層形から固定長レコード（品詞・コスト・辞書形ID）を引く
//! ダブル配列トライを格納しています。
//!
//! ## 主な機能
//!
//! - **高速な形態素解析**: ビタビアルゴリズムを用いた最良パス探索
//! - **K-best解析**: 後ろ向きA*探索による複数候補の生成
//! - **メモリマップド辞書**: 起動が速く、複数スレッドで共有可能
//! - **未知語フォールバック**: 辞書にない文字列も必ずトークン化
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), himotoki::HimotokiError> {
//! use himotoki::{Dictionary, DictionaryBuilder, Tokenizer, WordEntry};
//!
//! let mut builder = DictionaryBuilder::new();
//! builder.push(
//!     "天気",
//!     WordEntry { seq: 1438690, cost: 10, pos_id: 1, conj_type: 0, base_seq: 1438690 },
//! );
//! builder.push(
//!     "が",
//!     WordEntry { seq: 2028930, cost: 5, pos_id: 82, conj_type: 0, base_seq: 2028930 },
//! );
//!
//! let dict = Dictionary::from_bytes(builder.build()?)?;
//! let tokenizer = Tokenizer::new(dict);
//!
//! let tokens = tokenizer.tokenize("天気が");
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].surface(), "天気");
//! assert_eq!(tokens[0].pos(), "n");
//! assert_eq!(tokens[1].surface(), "が");
//! assert_eq!(tokens[1].pos(), "prt");
//! # Ok(())
//! # }
//! ```
//!
//! ## プロセス共通の辞書
//!
//! [`tokenize`]・[`analyze`]・[`warm_up`]のモジュールレベル関数は、
//! 環境変数`HIMOTOKI_DICT`（未設定時は`data/himotoki.dic`）の辞書を
//! 一度だけ読み込んで共有します。

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// 文字種の判定
pub mod characters;

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// エッジスコアの計算
mod scorer;

/// 文の内部表現
mod sentence;

/// トークン型の定義
pub mod token;

/// トークナイザーの実装
pub mod tokenizer;

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

// Re-exports
pub use dictionary::{Dictionary, DictionaryBuilder, LexMatch, WordEntry};
pub use errors::{HimotokiError, Result};
pub use token::{Analysis, Token};
pub use tokenizer::Tokenizer;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 辞書パスを上書きする環境変数の名前
pub const DICT_PATH_ENV: &str = "HIMOTOKI_DICT";

const DEFAULT_DICT_PATH: &str = "data/himotoki.dic";

static GLOBAL_TOKENIZER: OnceLock<Tokenizer> = OnceLock::new();

/// プロセス共通の辞書のパスを返します。
///
/// 環境変数`HIMOTOKI_DICT`が設定されていればその値、未設定であれば
/// `data/himotoki.dic`です。
pub fn default_dictionary_path() -> PathBuf {
    std::env::var_os(DICT_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DICT_PATH))
}

/// プロセス共通のトークナイザーを返します。
///
/// 初回呼び出しで辞書を読み込みます。初期化が競合した場合は一方の
/// 結果のみが採用され、敗者の辞書はそのまま破棄されます。
fn global_tokenizer() -> Result<&'static Tokenizer> {
    if let Some(tokenizer) = GLOBAL_TOKENIZER.get() {
        return Ok(tokenizer);
    }
    // Opening happens outside get_or_init so that a failure can be
    // reported to the caller instead of poisoning the cell.
    let dict = Dictionary::from_path(default_dictionary_path())?;
    log::debug!("global tokenizer initialized");
    Ok(GLOBAL_TOKENIZER.get_or_init(|| Tokenizer::new(dict)))
}

/// プロセス共通の辞書でテキストをトークン化します。
///
/// 空の入力に対しては空のベクトルを返します。
///
/// # エラー
///
/// 辞書の読み込みに失敗した場合のみエラーを返します。
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    Ok(global_tokenizer()?.tokenize(text))
}

/// プロセス共通の辞書でテキストを解析し、最大`limit`件の候補を返します。
///
/// # エラー
///
/// 辞書の読み込みに失敗した場合、または`limit`が1未満の場合に
/// エラーを返します。
pub fn analyze(text: &str, limit: usize) -> Result<Vec<Analysis>> {
    global_tokenizer()?.analyze(text, limit)
}

/// プロセス共通の辞書を事前に読み込みます。
///
/// 冪等であり、2回目以降の呼び出しは何もしません。経過時間を返します。
pub fn warm_up() -> Result<Duration> {
    let start = Instant::now();
    global_tokenizer()?;
    Ok(start.elapsed())
}

/// ライブラリのバージョン文字列を返します。
pub fn version() -> &'static str {
    VERSION
}
