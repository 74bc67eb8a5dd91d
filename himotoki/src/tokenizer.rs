//! Viterbiアルゴリズムに基づくトークナイザー。
//!
//! このモジュールは、日本語形態素解析のためのメイントークナイザーを
//! 提供します。入力文の各位置で辞書の共通接頭辞検索により候補エッジを
//! 列挙し、ラティス上の前向き動的計画法で最良の分割を求めます。
//! 複数候補が必要な場合は後ろ向きA*探索でK-best解を生成します。
//!
//! # 候補の列挙
//!
//! 各開始位置について以下のエッジを生成します:
//!
//! 1. 辞書にマッチしたすべての語（同形異義語・活用形を含む）
//! 2. 常に1文字の未知語エッジ（これによりどの入力でも必ず分割が存在します）
//! 3. カタカナ・数字・ラテン文字の同種連続（長さ2以上）を覆う未知語エッジ。
//!    外来語や数値が細切れになるのを防ぎます。漢字とひらがなの連続は
//!    辞書に任せるため連結しません。
//!
//! # 例
//!
//! ```no_run
//! use himotoki::{Dictionary, Tokenizer};
//!
//! let dict = Dictionary::from_path("data/himotoki.dic")?;
//! let tokenizer = Tokenizer::new(dict);
//!
//! for token in tokenizer.tokenize("今日は天気がいい") {
//!     println!("{}\t{}", token.surface(), token.pos());
//! }
//! # Ok::<(), himotoki::HimotokiError>(())
//! ```
pub(crate) mod kbest;
pub(crate) mod lattice;

use std::sync::Arc;

use hashbrown::HashSet;

use crate::characters::{char_class, CharClass};
use crate::dictionary::{Dictionary, WordEntry, UNKNOWN_POS_ID};
use crate::errors::{HimotokiError, Result};
use crate::scorer;
use crate::sentence::Sentence;
use crate::token::{Analysis, Token};
use crate::tokenizer::kbest::KBestGenerator;
use crate::tokenizer::lattice::{Lattice, Node};

/// 合成された未知語レコードを返します。
#[inline(always)]
pub(crate) const fn unknown_entry() -> WordEntry {
    WordEntry {
        seq: 0,
        cost: 0,
        pos_id: UNKNOWN_POS_ID,
        conj_type: 0,
        base_seq: 0,
    }
}

/// 形態素解析を行うトークナイザー。
///
/// 辞書データを保持し、最良パスのトークン化（[`tokenize`]）と
/// K-best解析（[`analyze`]）を提供します。辞書はオープン後は読み取り
/// 専用のため、1つの`Tokenizer`を複数スレッドから同時に使用できます。
///
/// [`tokenize`]: Self::tokenize
/// [`analyze`]: Self::analyze
#[derive(Clone)]
pub struct Tokenizer {
    dict: Arc<Dictionary>,
}

impl Tokenizer {
    /// 新しいトークナイザーを作成します。
    ///
    /// 辞書はトークナイザーに所有権が移動します。複数のトークナイザー間で
    /// 辞書を共有する必要がある場合は、
    /// [`Tokenizer::from_shared_dictionary`]を使用してください。
    pub fn new(dict: Dictionary) -> Self {
        Self {
            dict: Arc::new(dict),
        }
    }

    /// 共有された辞書から新しいトークナイザーを作成します。
    ///
    /// 複数のトークナイザーインスタンスが辞書データを再読み込みすることなく
    /// 同じ辞書を共有するマルチスレッドシナリオで便利です。
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
        Self { dict }
    }

    /// 辞書への参照を取得します。
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// 入力文をトークン化し、最良パスのトークン列を返します。
    ///
    /// 空の入力に対しては空のベクトルを返します。有効なUTF-8文字列で
    /// あれば失敗しません。辞書にない文字は未知語トークンになります。
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut sent = Sentence::new();
        sent.set_sentence(text);
        sent.compile();

        let mut lattice = Lattice::default();
        self.build_lattice(&sent, &mut lattice);

        let mut top_nodes = Vec::new();
        lattice.append_top_nodes(&mut top_nodes);
        top_nodes.reverse();

        top_nodes
            .iter()
            .map(|&(end_word, ref node)| self.materialize(&sent, end_word, node))
            .collect()
    }

    /// 入力文を解析し、スコアの高い順に最大`limit`件の候補を返します。
    ///
    /// 最初の候補は[`tokenize`]の結果と（タイブレークを含めて）一致し、
    /// スコアは単調非増加です。空の入力に対しては空のベクトルを返します。
    ///
    /// # エラー
    ///
    /// `limit`が1未満の場合は[`HimotokiError::InvalidArgument`]を返します。
    ///
    /// [`tokenize`]: Self::tokenize
    pub fn analyze(&self, text: &str, limit: usize) -> Result<Vec<Analysis>> {
        if limit < 1 {
            return Err(HimotokiError::invalid_argument("limit", "must be >= 1"));
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let mut sent = Sentence::new();
        sent.set_sentence(text);
        sent.compile();

        let mut lattice = Lattice::default();
        self.build_lattice(&sent, &mut lattice);

        let mut results = Vec::with_capacity(limit);
        let mut seen = HashSet::new();
        for (edges, total_score) in KBestGenerator::new(&lattice) {
            // Identical edge sequences are suppressed (they can arise from
            // duplicated dictionary records).
            let signature: Vec<(usize, usize, i32, u8)> = edges
                .iter()
                .map(|&(end_word, ref node)| {
                    (node.start_word, end_word, node.entry.seq, node.entry.pos_id)
                })
                .collect();
            if !seen.insert(signature) {
                continue;
            }
            let tokens = edges
                .iter()
                .map(|&(end_word, ref node)| self.materialize(&sent, end_word, node))
                .collect();
            results.push((tokens, total_score));
            if results.len() == limit {
                break;
            }
        }
        Ok(results)
    }

    /// ラティス構造を構築します。
    ///
    /// 開始位置を昇順に処理します。各位置は1文字の未知語フォールバックに
    /// より常に到達可能なので、挿入時点で前向きスコアは確定しています。
    fn build_lattice(&self, sent: &Sentence, lattice: &mut Lattice) {
        lattice.reset(sent.len_char());

        for start_word in 0..sent.len_char() {
            let suffix = &sent.chars()[start_word..];

            for m in self.dict.common_prefix_iterator(suffix) {
                debug_assert!(start_word + m.end_char <= sent.len_char());
                let score = scorer::score(&suffix[..m.end_char], &m.entry);
                lattice.insert_node(start_word, start_word + m.end_char, m.entry, score);
            }

            // The single-character fallback keeps every position reachable.
            lattice.insert_node(
                start_word,
                start_word + 1,
                unknown_entry(),
                scorer::score_unknown(1),
            );

            // Coalesce homogeneous runs of katakana, digits, and Latin so
            // that foreign words and numbers stay in one piece.
            let run_len = sent.run_len(start_word);
            if run_len >= 2
                && matches!(
                    sent.char_class(start_word),
                    CharClass::Katakana | CharClass::Digit | CharClass::Latin
                )
            {
                lattice.insert_node(
                    start_word,
                    start_word + run_len,
                    unknown_entry(),
                    scorer::score_unknown(run_len),
                );
            }
        }
    }

    /// ラティスのエッジから公開用の[`Token`]を組み立てます。
    fn materialize(&self, sent: &Sentence, end_word: usize, node: &Node) -> Token {
        let start_word = node.start_word;
        let surface =
            sent.raw()[sent.byte_position(start_word)..sent.byte_position(end_word)].to_string();

        let entry = &node.entry;
        if entry.seq == 0 && entry.pos_id == UNKNOWN_POS_ID {
            // Punctuation-only unknowns are reported separately so that
            // callers can filter them without a dictionary.
            let pos = if surface.chars().all(|c| char_class(c) == CharClass::Punct) {
                "punc"
            } else {
                "unk"
            };
            Token::new(
                surface.clone(),
                surface.clone(),
                pos.to_string(),
                surface,
                0,
                start_word as u32,
                end_word as u32,
            )
        } else {
            Token::new(
                surface.clone(),
                surface.clone(),
                self.dict.pos_name(entry.pos_id).to_string(),
                surface,
                entry.base_seq,
                start_word as u32,
                end_word as u32,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::DictionaryBuilder;

    fn word(seq: i32, cost: i16, pos_id: u8) -> WordEntry {
        WordEntry {
            seq,
            cost,
            pos_id,
            conj_type: 0,
            base_seq: seq,
        }
    }

    fn conjugated(seq: i32, cost: i16, pos_id: u8, conj_type: u8, base_seq: i32) -> WordEntry {
        WordEntry {
            seq,
            cost,
            pos_id,
            conj_type,
            base_seq,
        }
    }

    #[track_caller]
    fn build_test_tokenizer() -> Tokenizer {
        let mut builder = DictionaryBuilder::new();
        builder.push("今日", word(1579110, 5, 1));
        builder.push("今日は", word(1289400, 20, 73));
        builder.push("は", word(2028920, 8, 82));
        builder.push("天気", word(1438690, 10, 1));
        builder.push("天気が", word(9000001, 5, 73));
        builder.push("が", word(2028930, 5, 82));
        builder.push("いい", word(2820690, 12, 41));
        builder.push("です", word(1628500, 6, 71));
        builder.push("ね", word(2029080, 15, 82));
        builder.push("俺", word(1576870, 10, 80));
        builder.push("の", word(2029110, 5, 82));
        builder.push("力", word(1554820, 8, 1));
        builder.push("を", word(2029010, 5, 82));
        builder.push("見せる", word(1259290, 10, 10));
        builder.push("見せて", conjugated(8003001, 15, 10, 8, 1259290));
        builder.push("やる", word(1612950, 12, 19));
        builder.push("絶対", word(1387610, 8, 1));
        builder.push("絶対に", word(2067770, 10, 50));
        builder.push("に", word(2028990, 5, 82));
        builder.push("負ける", word(1497640, 10, 10));
        builder.push("負けない", conjugated(8003002, 18, 10, 12, 1497640));
        builder.push("こんにちは", word(1289400, 5, 74));

        let dict = Dictionary::from_bytes(builder.build().unwrap()).unwrap();
        Tokenizer::new(dict)
    }

    fn surfaces(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.surface()).collect()
    }

    #[test]
    fn test_tokenize_sentence() {
        let tokenizer = build_test_tokenizer();
        let tokens = tokenizer.tokenize("今日は天気がいいですね。");
        assert_eq!(
            surfaces(&tokens),
            vec!["今日", "は", "天気", "が", "いい", "です", "ね", "。"]
        );
        assert_eq!(tokens[0].pos(), "n");
        assert_eq!(tokens[1].pos(), "prt");
        assert_eq!(tokens[4].pos(), "adj-ix");
        assert_eq!(tokens[5].pos(), "cop");
        assert_eq!(tokens[7].pos(), "punc");
        assert_eq!(tokens[0].base_form_id(), 1579110);
    }

    #[test]
    fn test_tokenize_detaches_particles() {
        let tokenizer = build_test_tokenizer();
        let tokens = tokenizer.tokenize("俺の力を見せてやる");
        assert_eq!(
            surfaces(&tokens),
            vec!["俺", "の", "力", "を", "見せて", "やる"]
        );
        // The conjugated form resolves to its dictionary form id.
        assert_eq!(tokens[4].base_form_id(), 1259290);
    }

    #[test]
    fn test_tokenize_adverb_splits_before_verb() {
        let tokenizer = build_test_tokenizer();
        let tokens = tokenizer.tokenize("絶対に負けない");
        assert_eq!(tokens[0].surface(), "絶対");
        assert_eq!(tokens[1].surface(), "に");
        assert_eq!(tokens.last().unwrap().end(), 7);
    }

    #[test]
    fn test_tokenize_empty() {
        let tokenizer = build_test_tokenizer();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.analyze("", 5).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_runs_are_coalesced() {
        let tokenizer = build_test_tokenizer();
        let tokens = tokenizer.tokenize("XYZ123");
        assert_eq!(surfaces(&tokens), vec!["XYZ", "123"]);
        assert!(tokens.iter().all(|t| t.pos() == "unk"));
        assert!(tokens.iter().all(|t| t.base_form_id() == 0));
    }

    #[test]
    fn test_unknown_kanji_is_not_coalesced() {
        let tokenizer = build_test_tokenizer();
        let tokens = tokenizer.tokenize("犬猫");
        assert_eq!(surfaces(&tokens), vec!["犬", "猫"]);
        assert!(tokens.iter().all(|t| t.pos() == "unk"));
    }

    #[test]
    fn test_all_kana_word_is_not_split() {
        let tokenizer = build_test_tokenizer();
        let tokens = tokenizer.tokenize("こんにちは。");
        assert_eq!(surfaces(&tokens), vec!["こんにちは", "。"]);
    }

    #[test]
    fn test_particle_split_law() {
        // A known noun followed by a known particle splits even when the
        // concatenation itself is a dictionary key.
        let tokenizer = build_test_tokenizer();
        assert_eq!(surfaces(&tokenizer.tokenize("天気が")), vec!["天気", "が"]);
        assert_eq!(surfaces(&tokenizer.tokenize("今日は")), vec!["今日", "は"]);
    }

    #[test]
    fn test_coverage_and_offsets() {
        let tokenizer = build_test_tokenizer();
        for text in [
            "今日は天気がいいですね。",
            "俺の力を見せてやる",
            "絶対に負けない",
            "XYZ123",
            "犬猫カフェGOOD",
            "今日はXYZ",
        ] {
            let tokens = tokenizer.tokenize(text);
            let concat: String = tokens.iter().map(|t| t.surface()).collect();
            assert_eq!(concat, text);

            let chars: Vec<char> = text.chars().collect();
            let mut pos = 0u32;
            for token in &tokens {
                assert_eq!(token.start(), pos);
                let span: String = chars[token.range_char()].iter().collect();
                assert_eq!(span, token.surface());
                pos = token.end();
            }
            assert_eq!(pos as usize, chars.len());
        }
    }

    #[test]
    fn test_determinism() {
        let tokenizer = build_test_tokenizer();
        let text = "今日は天気がいいですね。";
        let first = tokenizer.tokenize(text);
        for _ in 0..3 {
            assert_eq!(tokenizer.tokenize(text), first);
        }
    }

    #[test]
    fn test_analyze_limit_validation() {
        let tokenizer = build_test_tokenizer();
        let err = tokenizer.analyze("今日は", 0).unwrap_err();
        assert!(matches!(err, HimotokiError::InvalidArgument(_)));
    }

    #[test]
    fn test_analyze_first_result_matches_tokenize() {
        let tokenizer = build_test_tokenizer();
        let text = "今日は天気がいいですね。";
        let analyses = tokenizer.analyze(text, 1).unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].0, tokenizer.tokenize(text));
        // 95 + 42 + 90 + 45 + 88 + 94 + 35 - 150
        assert_eq!(analyses[0].1, 339.0);
    }

    #[test]
    fn test_analyze_scores_are_non_increasing() {
        let tokenizer = build_test_tokenizer();
        let analyses = tokenizer.analyze("今日は天気がいいですね。", 5).unwrap();
        assert!(analyses.len() > 1);
        for pair in analyses.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        assert_eq!(analyses[0].0, tokenizer.tokenize("今日は天気がいいですね。"));
    }

    #[test]
    fn test_analyze_particle_penalty_effect() {
        let tokenizer = build_test_tokenizer();
        let analyses = tokenizer.analyze("今日は", 3).unwrap();
        assert_eq!(analyses.len(), 3);

        // The split must rank above the single-token dictionary entry.
        let split = analyses
            .iter()
            .find(|(tokens, _)| surfaces(tokens) == ["今日", "は"])
            .expect("split analysis must be present");
        let merged = analyses
            .iter()
            .find(|(tokens, _)| surfaces(tokens) == ["今日は"])
            .expect("single-token analysis must be present");
        assert!(split.1 >= merged.1);

        // 150 - min(20, 100) - 60
        assert_eq!(merged.1, 70.0);
        assert_eq!(split.1, 137.0);
    }

    #[test]
    fn test_concurrent_tokenize() {
        let tokenizer = build_test_tokenizer();
        let text = "今日は天気がいいですね。";
        let expected = tokenizer.tokenize(text);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    assert_eq!(tokenizer.tokenize(text), expected);
                });
            }
        });
    }

    #[test]
    fn test_shared_dictionary() {
        let dict = Arc::new(
            Dictionary::from_bytes({
                let mut b = DictionaryBuilder::new();
                b.push("天気", word(1438690, 10, 1));
                b.build().unwrap()
            })
            .unwrap(),
        );
        let t1 = Tokenizer::from_shared_dictionary(Arc::clone(&dict));
        let t2 = Tokenizer::from_shared_dictionary(Arc::clone(&dict));
        assert_eq!(surfaces(&t1.tokenize("天気")), vec!["天気"]);
        assert_eq!(surfaces(&t2.tokenize("天気")), vec!["天気"]);
    }
}
