//! Lexicon
//!
//! Read-only tables the rule extractor scans: intent trigger phrases,
//! category/brand/godown/payment-mode aliases (English, Hinglish and
//! Devanagari), and the ordered regex cascades for size, quantity+unit and
//! price.
//!
//! Every table is evaluated in declaration order and the first hit wins, so
//! reordering an entry changes parse outcomes for ambiguous input. Alias
//! matching is plain substring containment on lower-cased text; a short
//! alias embedded in an unrelated word will match.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::Arc;

use voice_command_core::{Category, GodownHint, Intent, PaymentMode, Uom};

/// A canonical value and the surface forms that map to it
#[derive(Debug, Clone)]
pub struct AliasEntry<T> {
    pub value: T,
    /// Lower-case aliases
    pub aliases: &'static [&'static str],
}

impl<T: Copy> AliasEntry<T> {
    const fn new(value: T, aliases: &'static [&'static str]) -> Self {
        Self { value, aliases }
    }

    /// First entry with an alias contained in `text`, with the alias that hit
    pub fn find(entries: &[AliasEntry<T>], text: &str) -> Option<(T, &'static str)> {
        entries.iter().find_map(|entry| {
            entry
                .aliases
                .iter()
                .find(|alias| text.contains(**alias))
                .map(|alias| (entry.value, *alias))
        })
    }
}

/// Size pattern families, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    /// TMT diameter ("8mm")
    Millimetre,
    /// Pipe cross-section ("40x40")
    CrossSection,
    /// Square section ("25sq")
    Square,
    /// Round section ("20rd")
    Round,
}

impl SizeKind {
    fn normalise(&self, caps: &Captures<'_>) -> Option<String> {
        let first = caps.get(1)?.as_str();
        Some(match self {
            SizeKind::Millimetre => format!("{}mm", first),
            SizeKind::CrossSection => format!("{}x{}", first, caps.get(2)?.as_str()),
            SizeKind::Square => format!("{}sq", first),
            SizeKind::Round => format!("{}rd", first),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SizePattern {
    pub kind: SizeKind,
    pub regex: Regex,
}

impl SizePattern {
    /// Normalised size string and the span it was read from
    pub fn apply(&self, text: &str) -> Option<(String, Range<usize>)> {
        let caps = self.regex.captures(text)?;
        let size = self.kind.normalise(&caps)?;
        Some((size, caps.get(0)?.range()))
    }
}

/// Quantity immediately followed by a unit word
#[derive(Debug, Clone)]
pub struct UnitPattern {
    pub uom: Uom,
    pub regex: Regex,
}

impl UnitPattern {
    /// Quantity and the span of the whole "number + unit" match
    pub fn apply(&self, text: &str) -> Option<(f64, Range<usize>)> {
        let caps = self.regex.captures(text)?;
        let quantity = caps.get(1)?.as_str().parse().ok()?;
        Some((quantity, caps.get(0)?.range()))
    }
}

/// One word order for stating a price. The first participating capture
/// group holds the number.
#[derive(Debug, Clone)]
pub struct PricePattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl PricePattern {
    /// Price and the byte span of the number
    pub fn apply(&self, text: &str) -> Option<(f64, Range<usize>)> {
        let caps = self.regex.captures(text)?;
        let m = caps.iter().skip(1).flatten().next()?;
        let value = m.as_str().parse().ok()?;
        Some((value, m.range()))
    }
}

/// Intent trigger phrases. Most specific first: generic verbs like
/// "kar do" decide only after everything else failed.
static INTENT_TRIGGERS: &[AliasEntry<Intent>] = &[
    AliasEntry::new(
        Intent::CancelAction,
        &["cancel", "रद्द", "radd", "rehne do", "रहने दो", "mat karo", "मत करो"],
    ),
    AliasEntry::new(
        Intent::ConfirmAction,
        &["confirm", "pakka", "पक्का", "theek hai", "ठीक है"],
    ),
    AliasEntry::new(
        Intent::PaymentReminder,
        &["reminder", "रिमाइंडर", "yaad dila", "याद दिला", "tagada", "तगादा"],
    ),
    AliasEntry::new(
        Intent::ShareLedger,
        &[
            "ledger bhej",
            "ledger share",
            "share ledger",
            "send ledger",
            "khata bhej",
            "खाता भेज",
            "hisab bhej",
            "हिसाब भेज",
        ],
    ),
    AliasEntry::new(
        Intent::CheckLedger,
        &["ledger", "khata", "खाता", "hisab", "हिसाब", "baki", "बाकी", "udhaar", "उधार"],
    ),
    AliasEntry::new(
        Intent::AddPayment,
        &["payment", "पेमेंट", "jama", "जमा", "bhugtan", "भुगतान"],
    ),
    AliasEntry::new(
        Intent::TransferStock,
        &["transfer", "ट्रांसफर", "shift", "शिफ्ट"],
    ),
    AliasEntry::new(
        Intent::AddStockManual,
        &[
            "stock add",
            "add stock",
            "stock jod",
            "स्टॉक जोड़",
            "stock me daal",
            "maal aaya",
            "माल आया",
        ],
    ),
    AliasEntry::new(
        Intent::CheckStock,
        &["stock", "स्टॉक", "kitna maal", "कितना माल", "inventory"],
    ),
    AliasEntry::new(
        Intent::CalculateWeight,
        &["weight", "वजन", "vajan", "wajan", "kitne kilo", "कितने किलो"],
    ),
    AliasEntry::new(
        Intent::CalculatePrice,
        &["total", "टोटल", "kitne ka padega", "कितने का पड़ेगा", "calculate price"],
    ),
    AliasEntry::new(
        Intent::CheckOrderStatus,
        &["order status", "order kahan", "ऑर्डर कहाँ", "delivery kab", "डिलीवरी कब"],
    ),
    AliasEntry::new(Intent::CreateOrder, &["order", "ऑर्डर", "booking", "बुकिंग"]),
    AliasEntry::new(
        Intent::CreateEstimate,
        &["estimate", "एस्टीमेट", "quotation", "कोटेशन", "bill bana", "बिल बना"],
    ),
    AliasEntry::new(
        Intent::UpdateRate,
        &[
            "update rate",
            "rate update",
            "set rate",
            "change rate",
            "naya rate",
            "नया रेट",
            "kar do",
            "kardo",
            "कर दो",
        ],
    ),
    // Leading space keeps "rate" from firing inside "ultratech"; the
    // extractor pads the text so a sentence-initial "rate" still hits.
    AliasEntry::new(
        Intent::CheckRate,
        &[" rate", "रेट", "bhav", "भाव", "price", "दाम", "daam"],
    ),
];

static CATEGORIES: &[AliasEntry<Category>] = &[
    AliasEntry::new(
        Category::Tmt,
        &["tmt", "टीएमटी", "sariya", "saria", "सरिया", "rod"],
    ),
    AliasEntry::new(Category::Cement, &["cement", "सीमेंट", "siment"]),
    AliasEntry::new(Category::Pipe, &["pipe", "पाइप"]),
    AliasEntry::new(Category::Angle, &["angle", "एंगल"]),
    AliasEntry::new(Category::Sheet, &["sheet", "शीट", "chadar", "चादर"]),
    AliasEntry::new(Category::Wire, &["wire", "वायर", "taar", "तार"]),
];

static BRANDS: &[AliasEntry<&'static str>] = &[
    AliasEntry::new("Ankur", &["ankur", "अंकुर"]),
    AliasEntry::new("Kamdhenu", &["kamdhenu", "कामधेनु"]),
    AliasEntry::new("Tata Tiscon", &["tata", "tiscon", "टाटा"]),
    AliasEntry::new("Jindal", &["jindal", "जिंदल"]),
    AliasEntry::new("SAIL", &["sail", "सेल"]),
    AliasEntry::new("Ultratech", &["ultratech", "अल्ट्राटेक"]),
    AliasEntry::new("ACC", &["acc", "एसीसी"]),
    AliasEntry::new("Ambuja", &["ambuja", "अंबुजा"]),
    AliasEntry::new("Apollo", &["apollo", "अपोलो"]),
];

static GODOWNS: &[AliasEntry<GodownHint>] = &[
    AliasEntry::new(
        GodownHint::Main,
        &["main", "मेन", "dukan", "दुकान", "shop"],
    ),
    AliasEntry::new(
        GodownHint::Yard,
        &["yard", "यार्ड", "doosra godown", "second godown", "दूसरा गोदाम"],
    ),
];

static PAYMENT_MODES: &[AliasEntry<PaymentMode>] = &[
    AliasEntry::new(PaymentMode::Cash, &["cash", "nakad", "नकद", "कैश"]),
    AliasEntry::new(
        PaymentMode::Online,
        &["online", "upi", "gpay", "phonepe", "ऑनलाइन"],
    ),
    AliasEntry::new(PaymentMode::Cheque, &["cheque", "chek", "चेक"]),
];

/// Words the customer-name heuristic must never return
static NAME_STOPWORDS: &[&str] = &[
    "rate", "bhav", "price", "stock", "maal", "ledger", "khata", "hisab", "payment", "order",
    "total", "weight", "reminder", "sab", "sabhi", "aaj", "kal", "is", "us", "iska", "uska",
    "usko", "isko", "mera", "mere", "apna", "the", "a", "an", "all", "me", "him", "her", "them",
    "godown", "bill", "estimate", "wale", "wala", "wali", "रेट", "भाव", "स्टॉक", "माल", "खाता", "हिसाब", "आज", "इस", "उस",
];

static SIZE_PATTERNS: Lazy<Vec<SizePattern>> = Lazy::new(|| {
    vec![
        SizePattern {
            kind: SizeKind::Millimetre,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:mm|एमएम|मिमी)").unwrap(),
        },
        SizePattern {
            kind: SizeKind::CrossSection,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*[x×*]\s*(\d+(?:\.\d+)?)").unwrap(),
        },
        SizePattern {
            kind: SizeKind::Square,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:sq|स्क्वायर)").unwrap(),
        },
        SizePattern {
            kind: SizeKind::Round,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:rd|round|राउंड)").unwrap(),
        },
    ]
});

// bag, pieces, bundle, kg, ton
static UNIT_PATTERNS: Lazy<Vec<UnitPattern>> = Lazy::new(|| {
    vec![
        UnitPattern {
            uom: Uom::Bags,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:bags?|bori|बोरी|बैग|katta|कट्टा)").unwrap(),
        },
        UnitPattern {
            uom: Uom::Pieces,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:pcs|pieces?|nag|नग|पीस|rods?)").unwrap(),
        },
        UnitPattern {
            uom: Uom::Bundle,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:bundles?|bundal|बंडल|gaddi|गड्डी)").unwrap(),
        },
        UnitPattern {
            uom: Uom::Kg,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:kgs?|kilo|किलो|केजी)").unwrap(),
        },
        UnitPattern {
            uom: Uom::Ton,
            regex: Regex::new(r"(\d+(?:\.\d+)?)\s*(?:tons?|tonne|टन)").unwrap(),
        },
    ]
});

static PRICE_PATTERNS: Lazy<Vec<PricePattern>> = Lazy::new(|| {
    vec![
        // "rate 65", "रेट है 65", "bhav = 70"
        PricePattern {
            name: "rate_then_number",
            regex: Regex::new(
                r"(?:rate|रेट|bhav|भाव)\s*(?:hai|है|ko|को|to|=|:)?\s*(?:rs\.?|₹)?\s*(\d+(?:\.\d+)?)\b",
            )
            .unwrap(),
        },
        // "65 rupaye", "₹65"
        PricePattern {
            name: "rupees",
            regex: Regex::new(
                r"(\d+(?:\.\d+)?)\s*(?:rupaye|rupees?|rs\b|रुपये|रुपए)|(?:₹|\brs\.?)\s*(\d+(?:\.\d+)?)",
            )
            .unwrap(),
        },
        // "to 65", "को 65"; phone-length runs are left to the phone hint
        PricePattern {
            name: "to_number",
            regex: Regex::new(r"(?:\bto|\bko|\bको)\s+(?:rs\.?\s*|₹\s*)?(\d{1,5}(?:\.\d+)?)\b").unwrap(),
        },
        // "65 kar do", "5000 jama karo"
        PricePattern {
            name: "number_then_verb",
            regex: Regex::new(
                r"(\d+(?:\.\d+)?)\s*(?:(?:jama|जमा)\s*)?(?:kar do|kardo|karo|कर दो|करो)",
            )
            .unwrap(),
        },
    ]
});

static SHARED: Lazy<Arc<Lexicon>> = Lazy::new(|| Arc::new(Lexicon::default()));

/// The complete lexicon handed to the extractor
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub intent_triggers: Vec<AliasEntry<Intent>>,
    pub categories: Vec<AliasEntry<Category>>,
    pub brands: Vec<AliasEntry<&'static str>>,
    pub godowns: Vec<AliasEntry<GodownHint>>,
    pub payment_modes: Vec<AliasEntry<PaymentMode>>,
    pub size_patterns: Vec<SizePattern>,
    pub unit_patterns: Vec<UnitPattern>,
    pub price_patterns: Vec<PricePattern>,
    pub name_stopwords: Vec<&'static str>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            intent_triggers: INTENT_TRIGGERS.to_vec(),
            categories: CATEGORIES.to_vec(),
            brands: BRANDS.to_vec(),
            godowns: GODOWNS.to_vec(),
            payment_modes: PAYMENT_MODES.to_vec(),
            size_patterns: SIZE_PATTERNS.to_vec(),
            unit_patterns: UNIT_PATTERNS.to_vec(),
            price_patterns: PRICE_PATTERNS.to_vec(),
            name_stopwords: NAME_STOPWORDS.to_vec(),
        }
    }
}

impl Lexicon {
    /// Process-wide default lexicon
    pub fn shared() -> Arc<Lexicon> {
        Arc::clone(&SHARED)
    }

    /// Canonical brand names, in table order
    pub fn brand_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.brands.iter().map(|entry| entry.value)
    }

    /// Byte spans of every intent trigger phrase occurring in `text`
    pub fn trigger_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        for alias in self.intent_triggers.iter().flat_map(|e| e.aliases.iter()) {
            let alias = alias.trim();
            for (start, hit) in text.match_indices(alias) {
                spans.push(start..start + hit.len());
            }
        }
        spans
    }

    /// True for a lexicon alias or stopword (exact, case-insensitive)
    pub fn is_reserved_word(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        let aliased = |aliases: &[&str]| aliases.iter().any(|a| a.trim() == word);

        self.name_stopwords.iter().any(|w| *w == word)
            || self.intent_triggers.iter().any(|e| aliased(e.aliases))
            || self.categories.iter().any(|e| aliased(e.aliases))
            || self.brands.iter().any(|e| aliased(e.aliases))
            || self.godowns.iter().any(|e| aliased(e.aliases))
            || self.payment_modes.iter().any(|e| aliased(e.aliases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_intent_has_triggers() {
        let lexicon = Lexicon::default();
        for intent in Intent::ALL {
            assert!(
                lexicon.intent_triggers.iter().any(|e| e.value == intent),
                "no trigger for {}",
                intent
            );
        }
    }

    #[test]
    fn test_aliases_are_lowercase() {
        let lexicon = Lexicon::default();
        let all = lexicon
            .categories
            .iter()
            .flat_map(|e| e.aliases.iter())
            .chain(lexicon.brands.iter().flat_map(|e| e.aliases.iter()))
            .chain(lexicon.intent_triggers.iter().flat_map(|e| e.aliases.iter()));
        for alias in all {
            assert_eq!(*alias, alias.to_lowercase());
        }
    }

    #[test]
    fn test_first_match_wins() {
        let lexicon = Lexicon::default();
        // "ledger bhej" is checked before plain "ledger"
        let hit = AliasEntry::find(&lexicon.intent_triggers, "ramesh ka ledger bhej do");
        assert_eq!(hit.map(|(i, _)| i), Some(Intent::ShareLedger));
    }

    #[test]
    fn test_substring_overmatch_is_preserved() {
        let lexicon = Lexicon::default();
        // "acc" inside "account" still matches the ACC brand
        let hit = AliasEntry::find(&lexicon.brands, "account dekho");
        assert_eq!(hit.map(|(b, _)| b), Some("ACC"));
    }

    #[test]
    fn test_rate_trigger_ignores_brand_substring() {
        let lexicon = Lexicon::default();
        let hit = AliasEntry::find(&lexicon.intent_triggers, " ultratech cement 50 bori");
        assert_eq!(hit, None);
        let hit = AliasEntry::find(&lexicon.intent_triggers, " ultratech ka rate");
        assert_eq!(hit.map(|(i, _)| i), Some(Intent::CheckRate));
    }

    #[test]
    fn test_trigger_spans() {
        let lexicon = Lexicon::default();
        let text = "अंकुर का रेट 65 कर दो";
        let spans = lexicon.trigger_spans(text);
        let do_start = text.rfind("दो").unwrap();
        assert!(spans
            .iter()
            .any(|span| span.start <= do_start && do_start < span.end));
    }

    #[test]
    fn test_price_to_number_skips_phone() {
        let lexicon = Lexicon::default();
        let to_number = lexicon
            .price_patterns
            .iter()
            .find(|p| p.name == "to_number")
            .unwrap();
        assert_eq!(to_number.apply("send reminder to 9876543210"), None);
        assert_eq!(to_number.apply("ankur 8mm को 70").map(|(p, _)| p), Some(70.0));
        // "को" inside a longer word is not the postposition
        assert_eq!(to_number.apply("उसको 70"), None);
    }

    #[test]
    fn test_size_cascade_order() {
        let lexicon = Lexicon::default();
        let first = |text: &str| {
            lexicon
                .size_patterns
                .iter()
                .find_map(|p| p.apply(text))
                .map(|(size, _)| size)
        };
        assert_eq!(first("ankur 8mm").as_deref(), Some("8mm"));
        assert_eq!(first("pipe 40 x 40").as_deref(), Some("40x40"));
        assert_eq!(first("25 sq pipe").as_deref(), Some("25sq"));
        assert_eq!(first("20 round").as_deref(), Some("20rd"));
    }

    #[test]
    fn test_reserved_words() {
        let lexicon = Lexicon::default();
        assert!(lexicon.is_reserved_word("Ankur"));
        assert!(lexicon.is_reserved_word("rate"));
        assert!(!lexicon.is_reserved_word("Ramesh"));
    }
}
