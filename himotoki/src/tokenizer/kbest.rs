//! K-best解生成モジュール。
//!
//! このモジュールは、前向き動的計画法の結果をヒューリスティックとして
//! 用いる後ろ向きA*探索により、スコアの高い順に分割パスを生成する
//! イテレータを提供します。

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use super::lattice::{Lattice, Node};

// A path is stored as a linked list of edges, which is pointed to by a
// QueueItem:
//
// QueueItem -> SearchPath (earliest edge) -> ... -> SearchPath (EOS anchor)

/// A*探索によって探索中の部分パス。
///
/// 文末から文頭方向へエッジを積んでいくため、連結リストを先頭から
/// たどると文頭側のエッジから順に得られます。
#[derive(Debug)]
struct SearchPath {
    /// このパスが到達している位置（文字単位）。
    pos: usize,
    /// 最後に選択したエッジと、その終端位置。EOSアンカーでは`None`。
    edge: Option<(usize, Node)>,
    /// 文末側の続きのパス。
    next: Option<Rc<SearchPath>>,
    /// 文末からこの位置までの後方合計スコア。
    backward_score: f64,
}

/// A*探索のための優先度付きキュー内のアイテム。
#[derive(Debug)]
struct QueueItem {
    /// 現在の部分パスへのポインタ。
    path: Rc<SearchPath>,
    /// パスの優先度。f(x) = g(x) + h(x)として計算されます。
    ///  - g(x)は文末からの後方スコア。
    ///  - h(x)は前向き動的計画法による文頭からの最良スコア。
    priority: f64,
    /// 同点時の決定性を保証する単調増加の挿入番号。小さいほど先に
    /// 取り出されます。
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for QueueItem {}
impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on priority; FIFO among equal priorities.
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// K-best分割結果のジェネレータ。
///
/// スコアが高い順に`(エッジ列, 合計スコア)`を生成するイテレータとして
/// 機能します。前向きスコアは厳密なヒューリスティックであるため、
/// 最初に生成されるパスは1-best探索の結果と一致します。
pub(crate) struct KBestGenerator<'a> {
    lattice: &'a Lattice,
    queue: BinaryHeap<QueueItem>,
    next_seq: u64,
}

impl<'a> KBestGenerator<'a> {
    /// 新しいK-bestジェネレータを作成します。
    pub fn new(lattice: &'a Lattice) -> Self {
        let mut queue = BinaryHeap::new();
        let anchor = Rc::new(SearchPath {
            pos: lattice.len_char(),
            edge: None,
            next: None,
            backward_score: 0.0,
        });
        queue.push(QueueItem {
            path: anchor,
            priority: lattice.total_best_score(),
            seq: 0,
        });
        Self {
            lattice,
            queue,
            next_seq: 0,
        }
    }

    fn expand(&mut self, path: &Rc<SearchPath>) {
        let nodes = self.lattice.nodes_ending_at(path.pos);
        let best_idx = self.lattice.best_edge_index(path.pos) as usize;
        // The DP-preferred edge is pushed first so that, combined with the
        // FIFO tie-break, the first completed path reproduces the 1-best
        // reconstruction including its tie-breaks.
        let order =
            std::iter::once(best_idx).chain((0..nodes.len()).filter(move |&i| i != best_idx));
        for i in order {
            let node = nodes[i];
            let backward_score = path.backward_score + node.score;
            let priority = backward_score + self.lattice.best_score_at(node.start_word);
            let new_path = Rc::new(SearchPath {
                pos: node.start_word,
                edge: Some((path.pos, node)),
                next: Some(Rc::clone(path)),
                backward_score,
            });
            self.next_seq += 1;
            self.queue.push(QueueItem {
                path: new_path,
                priority,
                seq: self.next_seq,
            });
        }
    }
}

impl Iterator for KBestGenerator<'_> {
    /// エッジ列（文頭から文末の順、各要素は`(終端位置, エッジ)`）と
    /// パスの合計スコアのタプル。
    type Item = (Vec<(usize, Node)>, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.queue.pop() {
            if item.path.pos == 0 {
                // A full path has been found; collect its edges. The linked
                // list starts at the earliest edge, so no reversal is needed.
                let mut edges = vec![];
                let mut cur = Some(Rc::clone(&item.path));
                while let Some(seg) = cur {
                    if let Some(edge) = seg.edge {
                        edges.push(edge);
                    }
                    cur = seg.next.clone();
                }
                return Some((edges, item.priority));
            }
            let path = Rc::clone(&item.path);
            self.expand(&path);
        }
        None
    }
}
