//! 文字種の判定
//!
//! コードポイント単位の純粋な分類関数を提供します。スコアラーと
//! 未知語処理（同種文字の連結）の両方から使用されます。

/// 1文字の粗い文字種。
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CharClass {
    /// ひらがな（U+3041..=U+309F）
    Hiragana,
    /// カタカナ（U+30A0..=U+30FF、U+31F0..=U+31FF）
    Katakana,
    /// 漢字（U+4E00..=U+9FFF、U+3400..=U+4DBF）
    Kanji,
    /// 数字（ASCIIおよび全角）
    Digit,
    /// ラテン文字（ASCIIおよび全角）
    Latin,
    /// 句読点・記号
    Punct,
    /// 上記以外
    Other,
}

/// 文字を[`CharClass`]に分類します。
pub const fn char_class(c: char) -> CharClass {
    match c {
        '\u{3041}'..='\u{309F}' => CharClass::Hiragana,
        '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => CharClass::Katakana,
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' => CharClass::Kanji,
        '0'..='9' | '\u{FF10}'..='\u{FF19}' => CharClass::Digit,
        'A'..='Z' | 'a'..='z' | '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
            CharClass::Latin
        }
        '\u{3000}'..='\u{303F}'
        | '!'..='/'
        | ':'..='@'
        | '['..='`'
        | '{'..='~'
        | '\u{FF01}'..='\u{FF0F}'
        | '\u{FF1A}'..='\u{FF20}'
        | '\u{FF3B}'..='\u{FF40}'
        | '\u{FF5B}'..='\u{FF65}'
        | '\u{2026}' => CharClass::Punct,
        _ => CharClass::Other,
    }
}

/// ひらがなまたはカタカナであれば`true`を返します。
#[inline(always)]
pub const fn is_kana(c: char) -> bool {
    matches!(char_class(c), CharClass::Hiragana | CharClass::Katakana)
}

/// 助詞として使われる1文字であれば`true`を返します。
///
/// 語末助詞ペナルティ（スコアラー）の判定に使用されます。
#[inline(always)]
pub const fn is_particle_char(c: char) -> bool {
    matches!(
        c,
        'は' | 'が' | 'を' | 'に' | 'で' | 'と' | 'の' | 'へ' | 'も' | 'や' | 'か' | 'ね'
            | 'よ' | 'な'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_class() {
        assert_eq!(char_class('あ'), CharClass::Hiragana);
        assert_eq!(char_class('ん'), CharClass::Hiragana);
        assert_eq!(char_class('ア'), CharClass::Katakana);
        assert_eq!(char_class('ー'), CharClass::Katakana);
        assert_eq!(char_class('ㇷ'), CharClass::Katakana);
        assert_eq!(char_class('漢'), CharClass::Kanji);
        assert_eq!(char_class('㐀'), CharClass::Kanji);
        assert_eq!(char_class('0'), CharClass::Digit);
        assert_eq!(char_class('９'), CharClass::Digit);
        assert_eq!(char_class('A'), CharClass::Latin);
        assert_eq!(char_class('ｚ'), CharClass::Latin);
        assert_eq!(char_class('。'), CharClass::Punct);
        assert_eq!(char_class('、'), CharClass::Punct);
        assert_eq!(char_class('!'), CharClass::Punct);
        assert_eq!(char_class('！'), CharClass::Punct);
        assert_eq!(char_class('…'), CharClass::Punct);
        assert_eq!(char_class('한'), CharClass::Other);
    }

    #[test]
    fn test_is_kana() {
        assert!(is_kana('の'));
        assert!(is_kana('ネ'));
        assert!(!is_kana('字'));
        assert!(!is_kana('x'));
    }

    #[test]
    fn test_is_particle_char() {
        for c in ['は', 'が', 'を', 'に', 'で', 'と', 'の', 'へ', 'も', 'や', 'か', 'ね', 'よ', 'な'] {
            assert!(is_particle_char(c), "{c} should be a particle char");
        }
        assert!(!is_particle_char('ら'));
        assert!(!is_particle_char('て'));
    }
}
