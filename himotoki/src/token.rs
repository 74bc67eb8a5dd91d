//! トークンの結果コンテナ
//!
//! このモジュールは、形態素解析の結果として得られるトークンを表現する型を
//! 提供します。トークンは所有型の値であり、解析器の内部状態から独立して
//! 保持・送信できます。

use std::ops::Range;

/// 形態素解析の結果トークン
///
/// トークンからは以下の情報にアクセスできます：
/// - 表層形（元のテキスト中の文字列）
/// - 読み（ひらがな。コンパクトレコードに読みが格納されていない場合は
///   表層形と同じ値になります）
/// - 品詞名
/// - 辞書形とそのシーケンスID
/// - 文字単位の位置（コードポイントオフセット、半開区間）
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    surface: String,
    reading: String,
    pos: String,
    base_form: String,
    base_form_id: i32,
    start: u32,
    end: u32,
}

/// 1つの解析候補。トークン列と合計スコアのペアです。
pub type Analysis = (Vec<Token>, f64);

impl Token {
    pub(crate) fn new(
        surface: String,
        reading: String,
        pos: String,
        base_form: String,
        base_form_id: i32,
        start: u32,
        end: u32,
    ) -> Self {
        Self {
            surface,
            reading,
            pos,
            base_form,
            base_form_id,
            start,
            end,
        }
    }

    /// トークンの表層形（元のテキスト中の文字列）を取得します。
    #[inline(always)]
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// トークンの読み（ひらがな）を取得します。
    ///
    /// 未知語および読みが格納されていない語では表層形と同じ値です。
    #[inline(always)]
    pub fn reading(&self) -> &str {
        &self.reading
    }

    /// トークンの品詞名を取得します。
    ///
    /// 未知語は`"unk"`、句読点のみの未知語は`"punc"`になります。
    #[inline(always)]
    pub fn pos(&self) -> &str {
        &self.pos
    }

    /// トークンの辞書形を取得します。
    ///
    /// コンパクトレコードからは辞書形の表層形を復元できないため、
    /// 現状では表層形と同じ値です。外部のリゾルバで
    /// [`base_form_id`](Self::base_form_id)から解決できます。
    #[inline(always)]
    pub fn base_form(&self) -> &str {
        &self.base_form
    }

    /// 辞書形のシーケンスIDを取得します。未知語では0です。
    #[inline(always)]
    pub fn base_form_id(&self) -> i32 {
        self.base_form_id
    }

    /// トークンの開始位置（文字単位）を取得します。
    #[inline(always)]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// トークンの終了位置（文字単位、排他的）を取得します。
    #[inline(always)]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// トークンの文字単位の位置範囲を取得します。
    #[inline(always)]
    pub fn range_char(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}
