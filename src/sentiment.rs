//! Sentiment scoring for message text
//!
//! A lexicon-based analyzer in the VADER style produces per-message polarity
//! scores. On top of it sit the categorical policy (compound score to label)
//! and the aggregate calculator used for whole result sets.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::models::{AggregateSentimentStats, MessageRecord, SentimentCategory, SentimentScores};

/// Compound scores at or above this are positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this are negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Anything that turns free text into polarity scores
pub trait SentimentModel {
    /// Score a piece of text. Empty text scores all zeros.
    fn polarity_scores(&self, text: &str) -> SentimentScores;
}

/// Map a compound score to a category. Never returns `Unknown`.
#[must_use]
pub fn category_from_compound(compound: f64) -> SentimentCategory {
    if compound.is_nan() {
        return SentimentCategory::Neutral;
    }
    if compound >= POSITIVE_THRESHOLD {
        SentimentCategory::Positive
    } else if compound > NEGATIVE_THRESHOLD {
        SentimentCategory::Neutral
    } else {
        SentimentCategory::Negative
    }
}

/// Mean of the given compound scores and its category.
///
/// An empty input yields `{0.0, Unknown}`. Zero scores stay in the
/// denominator, so neutral or empty messages dilute the mean.
#[must_use]
pub fn aggregate_compound_scores(scores: &[f64]) -> AggregateSentimentStats {
    if scores.is_empty() {
        return AggregateSentimentStats {
            mean_compound: 0.0,
            category: SentimentCategory::Unknown,
        };
    }

    let sum: f64 = scores.iter().sum();
    #[allow(clippy::cast_precision_loss)]
    let mean_compound = sum / scores.len() as f64;

    AggregateSentimentStats {
        mean_compound,
        category: category_from_compound(mean_compound),
    }
}

/// Sentiment front end shared by the reporting operations
pub struct SentimentAnalyzer {
    model: Box<dyn SentimentModel>,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new(Box::new(LexiconSentimentModel::new()))
    }
}

impl SentimentAnalyzer {
    /// Wrap a scoring model
    #[must_use]
    pub fn new(model: Box<dyn SentimentModel>) -> Self {
        Self { model }
    }

    /// Score optional text; absent or empty text gets the all-zero scores
    #[must_use]
    pub fn analyze(&self, text: Option<&str>) -> SentimentScores {
        match text {
            Some(t) if !t.is_empty() => self.model.polarity_scores(t),
            _ => SentimentScores::empty(),
        }
    }

    /// Category for a single message.
    ///
    /// Absent text is `Unknown`; present-but-empty text scores zero and is
    /// therefore `Neutral`.
    #[must_use]
    pub fn categorize_message(&self, text: Option<&str>) -> SentimentCategory {
        match text {
            None => SentimentCategory::Unknown,
            Some(t) => category_from_compound(self.analyze(Some(t)).compound),
        }
    }

    /// Aggregate sentiment over a result set; absent text counts as 0.0
    #[must_use]
    pub fn aggregate(&self, records: &[MessageRecord]) -> AggregateSentimentStats {
        let scores: Vec<f64> = records
            .iter()
            .map(|r| self.analyze(r.text.as_deref()).compound)
            .collect();
        aggregate_compound_scores(&scores)
    }
}

// Valence values on the usual -4..4 lexicon scale.
const LEXICON: &[(&str, f64)] = &[
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("wonderful", 2.7),
    ("fantastic", 2.6),
    ("happy", 2.7),
    ("joy", 2.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("like", 1.5),
    ("best", 3.2),
    ("better", 1.9),
    ("awesome", 3.1),
    ("perfect", 2.7),
    ("brilliant", 2.8),
    ("outstanding", 3.0),
    ("superb", 3.1),
    ("delightful", 2.9),
    ("pleased", 1.9),
    ("satisfied", 1.8),
    ("excited", 1.4),
    ("thrilled", 2.3),
    ("grateful", 2.0),
    ("blessed", 2.9),
    ("lucky", 1.8),
    ("successful", 2.7),
    ("win", 2.8),
    ("nice", 1.8),
    ("fun", 2.3),
    ("funny", 1.9),
    ("cool", 1.3),
    ("thanks", 1.9),
    ("thank", 1.5),
    ("glad", 2.0),
    ("yay", 2.4),
    ("haha", 1.6),
    ("lol", 1.8),
    ("congrats", 2.4),
    ("beautiful", 2.9),
    ("sweet", 2.0),
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("worst", -3.1),
    ("hate", -2.7),
    ("dislike", -1.6),
    ("poor", -2.1),
    ("disappointing", -2.2),
    ("disappointed", -1.9),
    ("sad", -2.1),
    ("angry", -2.3),
    ("upset", -1.6),
    ("frustrated", -2.4),
    ("annoyed", -1.6),
    ("irritated", -1.8),
    ("disgusted", -2.4),
    ("furious", -2.7),
    ("devastated", -3.1),
    ("depressed", -2.3),
    ("miserable", -2.8),
    ("hopeless", -2.0),
    ("desperate", -1.3),
    ("worried", -1.2),
    ("anxious", -1.0),
    ("scared", -1.9),
    ("afraid", -2.0),
    ("disgusting", -2.4),
    ("pathetic", -2.6),
    ("useless", -1.8),
    ("worthless", -1.9),
    ("sorry", -0.3),
    ("ugh", -1.8),
    ("sucks", -1.5),
    ("stupid", -2.4),
    ("sick", -2.2),
    ("tired", -1.9),
    ("hurt", -2.4),
    ("cry", -2.1),
    ("wrong", -2.1),
];

const BOOST_UP: f64 = 0.293;
const BOOST_DOWN: f64 = -0.293;
const CAPS_EMPHASIS: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_BOOST: f64 = 0.292;
const QUESTION_BOOST: f64 = 0.18;
const NORMALIZATION_ALPHA: f64 = 15.0;

const BOOSTERS: &[(&str, f64)] = &[
    ("very", BOOST_UP),
    ("extremely", BOOST_UP),
    ("incredibly", BOOST_UP),
    ("absolutely", BOOST_UP),
    ("completely", BOOST_UP),
    ("totally", BOOST_UP),
    ("really", BOOST_UP),
    ("so", BOOST_UP),
    ("super", BOOST_UP),
    ("quite", BOOST_UP),
    ("somewhat", BOOST_DOWN),
    ("slightly", BOOST_DOWN),
    ("barely", BOOST_DOWN),
    ("hardly", BOOST_DOWN),
    ("kinda", BOOST_DOWN),
    ("marginally", BOOST_DOWN),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nobody", "nowhere", "neither", "nor", "cannot", "dont",
    "doesnt", "didnt", "isnt", "wasnt", "wont", "cant", "aint",
];

/// VADER-style lexicon analyzer
pub struct LexiconSentimentModel {
    lexicon: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
}

impl Default for LexiconSentimentModel {
    fn default() -> Self {
        Self::new()
    }
}

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

impl LexiconSentimentModel {
    /// Build the analyzer with the bundled lexicon
    #[must_use]
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
        }
    }

    fn tokenize(text: &str) -> Vec<Token<'_>> {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|w| !w.is_empty())
            .map(|raw| Token {
                raw,
                lower: raw.to_lowercase(),
            })
            .collect()
    }

    fn is_shouted(word: &str) -> bool {
        word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase)
    }

    fn is_negation(word: &str) -> bool {
        let bare: String = word.chars().filter(|c| *c != '\'').collect();
        NEGATIONS.contains(&bare.as_str()) || word.ends_with("n't")
    }

    fn valence_at(&self, tokens: &[Token<'_>], i: usize, caps_differential: bool) -> f64 {
        let token = &tokens[i];
        if self.boosters.contains_key(token.lower.as_str()) {
            return 0.0;
        }
        let Some(&base) = self.lexicon.get(token.lower.as_str()) else {
            return 0.0;
        };

        let mut valence = base;
        if caps_differential && Self::is_shouted(token.raw) {
            valence += CAPS_EMPHASIS.copysign(valence);
        }

        for distance in 1..=3usize {
            let Some(j) = i.checked_sub(distance) else {
                break;
            };
            let previous = &tokens[j];
            if let Some(&boost) = self.boosters.get(previous.lower.as_str()) {
                let damping = match distance {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                let mut scalar = boost * damping;
                if caps_differential && Self::is_shouted(previous.raw) {
                    scalar += CAPS_EMPHASIS.copysign(boost);
                }
                valence += if valence < 0.0 { -scalar } else { scalar };
            }
            if Self::is_negation(&previous.lower) {
                valence *= NEGATION_SCALAR;
            }
        }

        valence
    }

    fn punctuation_emphasis(text: &str) -> f64 {
        let exclamations = text.matches('!').count().min(4);
        let questions = text.matches('?').count();
        #[allow(clippy::cast_precision_loss)]
        let mut emphasis = exclamations as f64 * EXCLAMATION_BOOST;
        if questions > 1 {
            #[allow(clippy::cast_precision_loss)]
            let q = if questions <= 3 { questions as f64 * QUESTION_BOOST } else { 0.96 };
            emphasis += q;
        }
        emphasis
    }
}

impl SentimentModel for LexiconSentimentModel {
    fn polarity_scores(&self, text: &str) -> SentimentScores {
        let normalized: String = text.nfc().collect();
        let tokens = Self::tokenize(&normalized);
        if tokens.is_empty() {
            return SentimentScores::empty();
        }

        let shouted = tokens.iter().filter(|t| Self::is_shouted(t.raw)).count();
        let caps_differential = shouted > 0 && shouted < tokens.len();

        let valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.valence_at(&tokens, i, caps_differential))
            .collect();

        let mut sum: f64 = valences.iter().sum();
        let emphasis = Self::punctuation_emphasis(&normalized);
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }

        let compound = (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0);

        let mut pos_sum: f64 = valences.iter().filter(|v| **v > 0.0).map(|v| v + 1.0).sum();
        let mut neg_sum: f64 = valences.iter().filter(|v| **v < 0.0).map(|v| v - 1.0).sum();
        #[allow(clippy::cast_precision_loss)]
        let neu_count = valences.iter().filter(|v| **v == 0.0).count() as f64;

        if pos_sum > neg_sum.abs() {
            pos_sum += emphasis;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= emphasis;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        if total == 0.0 {
            return SentimentScores::empty();
        }

        SentimentScores {
            neg: (neg_sum / total).abs(),
            neu: neu_count / total,
            pos: (pos_sum / total).abs(),
            compound,
        }
    }
}
