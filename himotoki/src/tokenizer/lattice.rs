//! ラティス（格子）構造の実装モジュール。
//!
//! ラティスのノードは入力の文字オフセット（0..=N）に対応し、エッジは
//! 辞書候補または未知語候補を表します。最良パスの探索は、エッジ挿入時に
//! 前向き動的計画法の緩和を行うことで実現されます。エッジは終端位置ごとの
//! ベクトルに格納され、スコアとバックポインタはフラットな配列で保持します。

use crate::dictionary::WordEntry;

const INVALID_IDX: u32 = u32::MAX;
const NO_SCORE: f64 = f64::NEG_INFINITY;

/// ラティス内のエッジ（候補ノード）。
///
/// 終端位置ごとのベクトルに格納されるため、開始位置のみを保持します。
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    /// エッジの開始位置（文字単位）。
    pub start_word: usize,
    /// このエッジが表すレコード。
    pub entry: WordEntry,
    /// エッジ単体のスコア。
    pub score: f64,
}

/// 最良パス探索用のラティス構造体。
///
/// `best_score[i]`は文頭から位置`i`までの最良合計スコア、`best_edge[i]`は
/// そのパスの最後のエッジ（`ends[i]`内のインデックス）です。バッファは
/// クリアして再利用されます。
#[derive(Default)]
pub(crate) struct Lattice {
    ends: Vec<Vec<Node>>,
    best_score: Vec<f64>,
    best_edge: Vec<u32>,
    len_char: usize,
}

impl Lattice {
    /// ラティスをリセットし、新しい文の処理を準備します。
    ///
    /// # 引数
    ///
    /// * `len_char` - 新しい文の文字数
    pub fn reset(&mut self, len_char: usize) {
        for v in self.ends.iter_mut() {
            v.clear();
        }
        let cur_len = self.ends.len();
        if cur_len <= len_char {
            self.ends.reserve(len_char + 1 - cur_len);
            for _ in cur_len..=len_char {
                self.ends.push(Vec::with_capacity(16));
            }
        }

        self.best_score.clear();
        self.best_score.resize(len_char + 1, NO_SCORE);
        self.best_score[0] = 0.0;
        self.best_edge.clear();
        self.best_edge.resize(len_char + 1, INVALID_IDX);
        self.len_char = len_char;
    }

    /// 設定された文の文字数を返します。
    #[inline(always)]
    pub const fn len_char(&self) -> usize {
        self.len_char
    }

    /// ラティスに新しいエッジを挿入し、終端位置の最良スコアを緩和します。
    ///
    /// 開始位置は単一文字の未知語フォールバックにより常に到達可能であり、
    /// 位置を昇順に処理する限り`best_score[start_word]`は確定済みです。
    pub fn insert_node(&mut self, start_word: usize, end_word: usize, entry: WordEntry, score: f64) {
        debug_assert!(start_word < end_word);
        debug_assert!(end_word <= self.len_char);
        debug_assert!(self.best_score[start_word] != NO_SCORE);

        let cand = self.best_score[start_word] + score;
        let node = Node {
            start_word,
            entry,
            score,
        };

        let cur_best = self.best_score[end_word];
        let preferred =
            cand > cur_best || (cand == cur_best && self.edge_preferred(&node, end_word));

        let idx = self.ends[end_word].len() as u32;
        self.ends[end_word].push(node);
        if preferred {
            self.best_score[end_word] = cand;
            self.best_edge[end_word] = idx;
        }
    }

    /// スコアが同点のときのエッジ優先判定。
    ///
    /// 長いエッジ、次に小さいコスト、次に小さい品詞IDの順で決定的に
    /// 選択されます。
    fn edge_preferred(&self, new: &Node, end_word: usize) -> bool {
        let cur_idx = self.best_edge[end_word];
        if cur_idx == INVALID_IDX {
            return true;
        }
        let cur = &self.ends[end_word][cur_idx as usize];
        // Ends are equal, so the smaller start is the longer edge.
        if new.start_word != cur.start_word {
            return new.start_word < cur.start_word;
        }
        if new.entry.cost != cur.entry.cost {
            return new.entry.cost < cur.entry.cost;
        }
        new.entry.pos_id < cur.entry.pos_id
    }

    /// 位置`pos`までの最良合計スコアを返します。
    #[inline(always)]
    pub fn best_score_at(&self, pos: usize) -> f64 {
        self.best_score[pos]
    }

    /// 文末までの最良合計スコアを返します。
    #[inline(always)]
    pub fn total_best_score(&self) -> f64 {
        self.best_score[self.len_char]
    }

    /// 位置`pos`で終わるすべてのエッジを返します。
    #[inline(always)]
    pub fn nodes_ending_at(&self, pos: usize) -> &[Node] {
        &self.ends[pos]
    }

    /// 位置`pos`の最良エッジの`ends[pos]`内インデックスを返します。
    #[inline(always)]
    pub fn best_edge_index(&self, pos: usize) -> u32 {
        self.best_edge[pos]
    }

    /// 最良パスのエッジをベクトルに追加します。
    ///
    /// 文末から後方にたどるため、追加される順序は文末から文頭です。
    /// 各要素は`(終端位置, エッジ)`のペアです。
    pub fn append_top_nodes(&self, top_nodes: &mut Vec<(usize, Node)>) {
        let mut end_word = self.len_char;
        while end_word != 0 {
            let idx = self.best_edge[end_word];
            debug_assert_ne!(idx, INVALID_IDX);
            let node = self.ends[end_word][idx as usize];
            top_nodes.push((end_word, node));
            end_word = node.start_word;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(seq: i32, cost: i16, pos_id: u8) -> WordEntry {
        WordEntry {
            seq,
            cost,
            pos_id,
            conj_type: 0,
            base_seq: seq,
        }
    }

    #[test]
    fn test_best_path() {
        let mut lattice = Lattice::default();
        lattice.reset(3);
        // Two ways to cover 3 chars: (0,2)+(2,3) vs (0,1)+(1,3).
        lattice.insert_node(0, 2, entry(1, 5, 1), 95.0);
        lattice.insert_node(0, 1, entry(2, 5, 1), 45.0);
        lattice.insert_node(1, 3, entry(3, 5, 1), 95.0);
        lattice.insert_node(2, 3, entry(4, 5, 1), 45.0);

        assert_eq!(lattice.total_best_score(), 140.0);
        let mut nodes = vec![];
        lattice.append_top_nodes(&mut nodes);
        nodes.reverse();
        let spans: Vec<(usize, usize)> = nodes.iter().map(|(e, n)| (n.start_word, *e)).collect();
        assert_eq!(spans, vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn test_tie_break_prefers_longer() {
        let mut lattice = Lattice::default();
        lattice.reset(2);
        lattice.insert_node(0, 1, entry(1, 0, 1), 10.0);
        // Both paths reach position 2 with score 20.
        lattice.insert_node(1, 2, entry(2, 0, 1), 10.0);
        lattice.insert_node(0, 2, entry(3, 0, 1), 20.0);

        let mut nodes = vec![];
        lattice.append_top_nodes(&mut nodes);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].1.entry.seq, 3);
    }

    #[test]
    fn test_tie_break_prefers_smaller_cost_then_pos() {
        let mut lattice = Lattice::default();
        lattice.reset(1);
        lattice.insert_node(0, 1, entry(1, 8, 2), 40.0);
        lattice.insert_node(0, 1, entry(2, 5, 3), 40.0);
        lattice.insert_node(0, 1, entry(3, 5, 1), 40.0);

        let mut nodes = vec![];
        lattice.append_top_nodes(&mut nodes);
        assert_eq!(nodes[0].1.entry.seq, 3);
    }
}
