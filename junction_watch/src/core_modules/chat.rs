// THEORY:
// The chat panel is a scripted conversation. The operator types something,
// it is appended straight away, and a little later a generated reply is
// appended after it. The transcript is append-only: there is no editing, no
// deletion and no threading.
//
// The module is split in two halves:
// 1.  `ChatTranscript` owns the message list and the only validation there is
//     (blank input is ignored).
// 2.  `ReplyStrategy` decides what the reply says. `Canned` draws one of seven
//     fixed lines; `Keyword` answers from a small keyword table and can quote
//     live dashboard facts passed in through `ReplyContext`.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

pub const GREETING: &str =
    "Hello! I'm your AI traffic assistant powered by Python ML algorithms. How can I help you today?";

pub const CANNED_REPLIES: [&str; 7] = [
    "Python ML models are analyzing traffic patterns in real-time using TensorFlow and OpenCV.",
    "Current traffic density is being processed by our Decision Tree algorithm trained on Delhi traffic data.",
    "Emergency protocols activated! Python scripts are coordinating with traffic control systems.",
    "Traffic signals optimized using Python-based reinforcement learning algorithms.",
    "Computer vision models detect violations with 98.5% accuracy using YOLO and Python.",
    "Historical traffic data from Delhi junctions is being analyzed using Pandas and NumPy.",
    "Real-time predictions generated by our Python-based neural network models.",
];

const KEYWORD_DEFAULT: &str =
    "I'm powered by Python ML algorithms including TensorFlow, YOLO, and OpenCV. Ask me about traffic, junctions, or our AI models!";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed by the operator.
    Authored,
    /// Produced by the assistant.
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub origin: Origin,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn is_generated(&self) -> bool {
        self.origin == Origin::Generated
    }
}

/// Dashboard facts a keyword reply may quote.
#[derive(Debug, Clone, Default)]
pub struct ReplyContext {
    pub junction_names: Vec<String>,
    pub violation_count: usize,
}

/// How the assistant picks its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyStrategy {
    #[default]
    Canned,
    Keyword,
}

impl ReplyStrategy {
    pub fn compose<R: Rng + ?Sized>(self, prompt: &str, context: &ReplyContext, rng: &mut R) -> String {
        match self {
            ReplyStrategy::Canned => CANNED_REPLIES
                .choose(rng)
                .copied()
                .unwrap_or(KEYWORD_DEFAULT)
                .to_string(),
            ReplyStrategy::Keyword => keyword_reply(prompt, context),
        }
    }
}

impl std::str::FromStr for ReplyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canned" => Ok(ReplyStrategy::Canned),
            "keyword" => Ok(ReplyStrategy::Keyword),
            other => Err(format!("expected `canned` or `keyword`, got `{other}`")),
        }
    }
}

// First matching keyword wins, in table order.
fn keyword_reply(prompt: &str, context: &ReplyContext) -> String {
    let prompt = prompt.trim().to_lowercase();
    let keys = ["hello", "python", "junctions", "ml", "accuracy", "violations"];
    let Some(key) = keys.iter().find(|k| prompt.contains(*k)) else {
        return KEYWORD_DEFAULT.to_string();
    };

    match *key {
        "hello" => "Hello! I'm your Python AI traffic assistant. I use TensorFlow, OpenCV, and YOLO for traffic analysis.".to_string(),
        "python" => "Yes! This system is built with Python using Flask, NumPy, Pandas, OpenCV, and TensorFlow for advanced traffic management.".to_string(),
        "junctions" => format!(
            "I monitor {} major Delhi junctions: {}",
            context.junction_names.len(),
            context.junction_names.join(", ")
        ),
        "ml" => "Our ML stack includes: TensorFlow for neural networks, YOLO for object detection, OpenCV for computer vision, and Scikit-learn for classification.".to_string(),
        "accuracy" => "Our Python AI models achieve 98.5% accuracy in traffic prediction and violation detection using advanced machine learning algorithms.".to_string(),
        _ => format!(
            "Currently tracking {} violations detected by our Python computer vision system.",
            context.violation_count
        ),
    }
}

/// Append-only chat history.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    /// A transcript opened with the assistant's greeting.
    pub fn with_greeting(timestamp: String) -> Self {
        Self {
            messages: vec![ChatMessage {
                text: GREETING.to_string(),
                origin: Origin::Generated,
                timestamp,
            }],
        }
    }

    pub fn empty() -> Self {
        Self { messages: Vec::new() }
    }

    /// Appends an operator message. Blank input is ignored and yields `None`.
    pub fn submit(&mut self, text: &str, timestamp: String) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage {
            text: text.to_string(),
            origin: Origin::Authored,
            timestamp,
        });
        self.messages.last()
    }

    /// Appends an assistant message.
    pub fn reply(&mut self, text: String, timestamp: String) -> &ChatMessage {
        self.messages.push(ChatMessage { text, origin: Origin::Generated, timestamp });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
