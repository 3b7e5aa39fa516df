//! Built-in romaji → hiragana rules (Hepburn and Kunrei spellings)
//!
//! The base syllables live in a compile-time `phf` map. Optional groups are
//! added on top when the table is built, as selected by `RomajiConfig`:
//!
//! - Doubled consonants: "kk" → "っ" with "k" left pending, so "kka" → "っか"
//! - "nn" → "ん"
//! - Kana punctuation: , . - [ ] → 、 。 ー 「 」
//!
//! "n" alone maps to "ん" but stays open while "na", "nya", ... are still
//! possible; it settles as soon as a key that cannot follow arrives.

use libkana_core::Table;
use phf::phf_map;
use tracing::debug;

use crate::RomajiConfig;

/// Base syllable table: romaji spelling → hiragana.
pub static ROMAJI_RULES: phf::Map<&'static str, &'static str> = phf_map! {
    // Vowels
    "a" => "あ", "i" => "い", "u" => "う", "e" => "え", "o" => "お",

    // Gojuon
    "ka" => "か", "ki" => "き", "ku" => "く", "ke" => "け", "ko" => "こ",
    "ca" => "か", "cu" => "く", "co" => "こ",
    "qa" => "くぁ", "qi" => "くぃ", "qe" => "くぇ", "qo" => "くぉ",
    "sa" => "さ", "si" => "し", "shi" => "し", "su" => "す", "se" => "せ", "so" => "そ",
    "ta" => "た", "ti" => "ち", "chi" => "ち", "tu" => "つ", "tsu" => "つ", "te" => "て", "to" => "と",
    "na" => "な", "ni" => "に", "nu" => "ぬ", "ne" => "ね", "no" => "の",
    "ha" => "は", "hi" => "ひ", "hu" => "ふ", "fu" => "ふ", "he" => "へ", "ho" => "ほ",
    "ma" => "ま", "mi" => "み", "mu" => "む", "me" => "め", "mo" => "も",
    "ya" => "や", "yu" => "ゆ", "yo" => "よ", "ye" => "いぇ",
    "ra" => "ら", "ri" => "り", "ru" => "る", "re" => "れ", "ro" => "ろ",
    "la" => "ぁ", "li" => "ぃ", "lu" => "ぅ", "le" => "ぇ", "lo" => "ぉ",
    "wa" => "わ", "wi" => "うぃ", "we" => "うぇ", "wo" => "を",
    "n" => "ん", "n'" => "ん", "xn" => "ん",

    // Dakuten / handakuten
    "ga" => "が", "gi" => "ぎ", "gu" => "ぐ", "ge" => "げ", "go" => "ご",
    "za" => "ざ", "zi" => "じ", "ji" => "じ", "zu" => "ず", "ze" => "ぜ", "zo" => "ぞ",
    "da" => "だ", "di" => "ぢ", "du" => "づ", "de" => "で", "do" => "ど",
    "ba" => "ば", "bi" => "び", "bu" => "ぶ", "be" => "べ", "bo" => "ぼ",
    "pa" => "ぱ", "pi" => "ぴ", "pu" => "ぷ", "pe" => "ぺ", "po" => "ぽ",
    "va" => "ゔぁ", "vi" => "ゔぃ", "vu" => "ゔ", "ve" => "ゔぇ", "vo" => "ゔぉ",

    // Youon
    "kya" => "きゃ", "kyi" => "きぃ", "kyu" => "きゅ", "kye" => "きぇ", "kyo" => "きょ",
    "gya" => "ぎゃ", "gyi" => "ぎぃ", "gyu" => "ぎゅ", "gye" => "ぎぇ", "gyo" => "ぎょ",
    "sya" => "しゃ", "syu" => "しゅ", "sye" => "しぇ", "syo" => "しょ",
    "sha" => "しゃ", "shu" => "しゅ", "she" => "しぇ", "sho" => "しょ",
    "zya" => "じゃ", "zyu" => "じゅ", "zye" => "じぇ", "zyo" => "じょ",
    "ja" => "じゃ", "ju" => "じゅ", "je" => "じぇ", "jo" => "じょ",
    "jya" => "じゃ", "jyu" => "じゅ", "jye" => "じぇ", "jyo" => "じょ",
    "tya" => "ちゃ", "tyu" => "ちゅ", "tye" => "ちぇ", "tyo" => "ちょ",
    "cha" => "ちゃ", "chu" => "ちゅ", "che" => "ちぇ", "cho" => "ちょ",
    "cya" => "ちゃ", "cyu" => "ちゅ", "cye" => "ちぇ", "cyo" => "ちょ",
    "dya" => "ぢゃ", "dyu" => "ぢゅ", "dye" => "ぢぇ", "dyo" => "ぢょ",
    "tha" => "てゃ", "thi" => "てぃ", "thu" => "てゅ", "the" => "てぇ", "tho" => "てょ",
    "dha" => "でゃ", "dhi" => "でぃ", "dhu" => "でゅ", "dhe" => "でぇ", "dho" => "でょ",
    "twu" => "とぅ", "dwu" => "どぅ",
    "nya" => "にゃ", "nyi" => "にぃ", "nyu" => "にゅ", "nye" => "にぇ", "nyo" => "にょ",
    "hya" => "ひゃ", "hyi" => "ひぃ", "hyu" => "ひゅ", "hye" => "ひぇ", "hyo" => "ひょ",
    "fa" => "ふぁ", "fi" => "ふぃ", "fe" => "ふぇ", "fo" => "ふぉ", "fyu" => "ふゅ",
    "bya" => "びゃ", "byi" => "びぃ", "byu" => "びゅ", "bye" => "びぇ", "byo" => "びょ",
    "pya" => "ぴゃ", "pyi" => "ぴぃ", "pyu" => "ぴゅ", "pye" => "ぴぇ", "pyo" => "ぴょ",
    "mya" => "みゃ", "myi" => "みぃ", "myu" => "みゅ", "mye" => "みぇ", "myo" => "みょ",
    "rya" => "りゃ", "ryi" => "りぃ", "ryu" => "りゅ", "rye" => "りぇ", "ryo" => "りょ",

    // Small kana
    "xa" => "ぁ", "xi" => "ぃ", "xu" => "ぅ", "xe" => "ぇ", "xo" => "ぉ",
    "xya" => "ゃ", "xyu" => "ゅ", "xyo" => "ょ",
    "lya" => "ゃ", "lyu" => "ゅ", "lyo" => "ょ",
    "xtu" => "っ", "xtsu" => "っ", "ltu" => "っ", "ltsu" => "っ",
    "xwa" => "ゎ", "lwa" => "ゎ",
    "xka" => "ゕ", "xke" => "ゖ",
};

/// Optional punctuation group.
pub static KANA_PUNCTUATION: phf::Map<&'static str, &'static str> = phf_map! {
    "," => "、",
    "." => "。",
    "-" => "ー",
    "[" => "「",
    "]" => "」",
};

/// Consonants whose doubling produces "っ". "n" is excluded: "nn" is "ん".
pub const DOUBLE_CONSONANTS: &str = "bcdfghjkmpqrstvwxyz";

/// Build a conversion table from the built-in rules.
pub fn romaji_table(config: &RomajiConfig) -> Table {
    let mut table = Table::with_config(config.base());

    for (input, result) in ROMAJI_RULES.entries() {
        table.add_rule(input, result, "");
    }

    if config.double_consonant_sokuon {
        let mut key = String::with_capacity(2);
        for c in DOUBLE_CONSONANTS.chars() {
            key.clear();
            key.push(c);
            key.push(c);
            table.add_rule(&key, "っ", &c.to_string());
        }
    }

    if config.nn_to_n {
        table.add_rule("nn", "ん", "");
    }

    if config.kana_punctuation {
        for (input, result) in KANA_PUNCTUATION.entries() {
            table.add_rule(input, result, "");
        }
    }

    debug!(
        rules = table.len(),
        sokuon = config.double_consonant_sokuon,
        punctuation = config.kana_punctuation,
        "built romaji table"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_rules() {
        let table = romaji_table(&RomajiConfig::default());
        assert_eq!(table.lookup("shi").map(|e| e.result()), Some("し"));
        assert_eq!(table.lookup("si").map(|e| e.result()), Some("し"));
        assert_eq!(table.lookup("kyo").map(|e| e.result()), Some("きょ"));
        assert!(table.has_sub_rules("ky"));
        assert!(table.lookup("ky").is_none());
    }

    #[test]
    fn test_double_consonants() {
        let table = romaji_table(&RomajiConfig::default());
        let entry = table.lookup("kk").unwrap();
        assert_eq!(entry.result(), "っ");
        assert_eq!(entry.pending(), "k");
        assert!(table.lookup("nn").map_or(false, |e| e.pending().is_empty()));

        let config = RomajiConfig {
            double_consonant_sokuon: false,
            ..RomajiConfig::default()
        };
        assert!(romaji_table(&config).lookup("kk").is_none());
    }

    #[test]
    fn test_optional_groups() {
        let config = RomajiConfig {
            nn_to_n: false,
            kana_punctuation: false,
            ..RomajiConfig::default()
        };
        let table = romaji_table(&config);
        assert!(table.lookup("nn").is_none());
        assert!(table.lookup(",").is_none());
        assert_eq!(table.lookup("n'").map(|e| e.result()), Some("ん"));

        let table = romaji_table(&RomajiConfig::default());
        assert_eq!(table.lookup("[").map(|e| e.result()), Some("「"));
    }

    #[test]
    fn test_table_size() {
        let table = romaji_table(&RomajiConfig::default());
        let expected = ROMAJI_RULES.len() + DOUBLE_CONSONANTS.len() + 1 + KANA_PUNCTUATION.len();
        assert_eq!(table.len(), expected);
    }
}
