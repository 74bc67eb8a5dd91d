//! 入力テキストの内部表現を提供するモジュール
//!
//! 入力文字列を文字単位に分割し、各文字の文字種やバイト位置のマッピング、
//! 同種文字の連続長などを計算・保持します。ラティス上のノードは
//! 文字オフセット（コードポイント単位）で表されるため、バイト位置への
//! 変換表をここで一度だけ構築します。

use crate::characters::{char_class, CharClass};

/// 入力テキストの内部表現を保持する構造体
///
/// # フィールド
///
/// * `input` - 元の入力文字列
/// * `chars` - 入力文字列を文字単位に分割した配列
/// * `c2b` - 文字位置からバイト位置へのマッピング配列
/// * `classes` - 各文字の文字種
/// * `run_len` - 各文字位置から同じ文字種が連続する長さ
#[derive(Default, Clone, Debug)]
pub(crate) struct Sentence {
    input: String,
    chars: Vec<char>,
    c2b: Vec<usize>,
    classes: Vec<CharClass>,
    run_len: Vec<usize>,
}

impl Sentence {
    /// 新しい空の`Sentence`インスタンスを生成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部状態をクリアします
    #[inline(always)]
    pub fn clear(&mut self) {
        self.input.clear();
        self.chars.clear();
        self.c2b.clear();
        self.classes.clear();
        self.run_len.clear();
    }

    /// 入力文字列を設定します
    ///
    /// この時点では文字列の解析は行われません。解析を行うには
    /// [`compile`]を呼び出す必要があります。
    ///
    /// [`compile`]: Self::compile
    pub fn set_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.input.push_str(input.as_ref());
    }

    /// 入力文字列を解析し、内部データ構造を構築します
    pub fn compile(&mut self) {
        self.compute_basic();
        self.compute_classes();
        self.compute_runs();
    }

    fn compute_basic(&mut self) {
        for (bi, ch) in self.input.char_indices() {
            self.chars.push(ch);
            self.c2b.push(bi);
        }
        self.c2b.push(self.input.len());
    }

    fn compute_classes(&mut self) {
        debug_assert!(!self.chars.is_empty());

        self.classes.reserve(self.chars.len());
        for &c in &self.chars {
            self.classes.push(char_class(c));
        }
    }

    /// 各文字位置から同じ文字種が連続する長さを計算します（内部メソッド）
    ///
    /// この情報は未知語処理において、連続する同種の文字を1つの候補として
    /// まとめて扱う際に使用されます。
    fn compute_runs(&mut self) {
        debug_assert_eq!(self.chars.len(), self.classes.len());

        self.run_len.resize(self.chars.len(), 1);
        for i in (1..self.chars.len()).rev() {
            if self.classes[i - 1] == self.classes[i] {
                self.run_len[i - 1] = self.run_len[i] + 1;
            }
        }
    }

    /// 元の入力文字列への参照を返します
    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.input
    }

    /// 文字配列への参照を返します
    #[inline(always)]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// 文字数（バイト数ではない）を返します
    #[inline(always)]
    pub fn len_char(&self) -> usize {
        self.chars.len()
    }

    /// 指定された文字位置に対応するバイト位置を返します
    #[inline(always)]
    pub fn byte_position(&self, pos_char: usize) -> usize {
        self.c2b[pos_char]
    }

    /// 指定された文字位置の文字種を返します
    #[inline(always)]
    pub fn char_class(&self, pos_char: usize) -> CharClass {
        self.classes[pos_char]
    }

    /// 指定された文字位置から同じ文字種が連続する長さを返します
    #[inline(always)]
    pub fn run_len(&self, pos_char: usize) -> usize {
        self.run_len[pos_char]
    }
}
