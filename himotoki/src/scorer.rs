//! 候補エッジのスコア計算
//!
//! スコアは「長い語を少なく」を基本方針とし、文字数ボーナスが支配的に
//! なるように設計されています。生起コストは二次的な曖昧性解消として働き、
//! 語末助詞ペナルティは「今日は」のような助詞を巻き込んだ候補を分割へ
//! 誘導します。定数は観測可能な分割結果を決めるため変更できません。

use crate::characters::{is_kana, is_particle_char};
use crate::dictionary::WordEntry;

/// 1文字あたりのボーナス。
pub(crate) const CHAR_WEIGHT: f64 = 50.0;

/// 生起コストの上限。外れ値のコストが長さ優先を覆さないように抑えます。
pub(crate) const COST_CLAMP: i32 = 100;

/// 語末助詞ペナルティ。
pub(crate) const PARTICLE_SUFFIX_PENALTY: f64 = 60.0;

/// 未知語エッジの固定ペナルティ。同じ長さの辞書語が常に勝ちます。
pub(crate) const UNKNOWN_PENALTY: f64 = 200.0;

/// 辞書レコードに対するエッジスコアを計算します。
///
/// 語末が助詞文字で、かつ助詞の前の語幹に仮名以外が含まれる場合に
/// ペナルティを課します。語幹がすべて仮名の語（こんにちは、ために、では
/// など）は1語として妥当なため対象外です。
pub(crate) fn score(surface: &[char], entry: &WordEntry) -> f64 {
    let len = surface.len();
    let cost_penalty = i32::from(entry.cost).min(COST_CLAMP);
    let mut base = len as f64 * CHAR_WEIGHT - f64::from(cost_penalty);
    if len >= 2 {
        let stem = &surface[..len - 1];
        if is_particle_char(surface[len - 1]) && !stem.iter().all(|&c| is_kana(c)) {
            base -= PARTICLE_SUFFIX_PENALTY;
        }
    }
    base
}

/// 未知語エッジのスコアを計算します。
#[inline(always)]
pub(crate) fn score_unknown(len_char: usize) -> f64 {
    len_char as f64 * CHAR_WEIGHT - UNKNOWN_PENALTY
}
