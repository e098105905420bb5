// Chat service - canned vehicle assistant with a simulated response delay
use crate::domain::chat::ChatMessage;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub const GREETING: &str = "Hello! I'm your vehicle health assistant. I can help you understand your vehicle's \
status, diagnose issues, and provide maintenance recommendations. How can I assist you today?";

const BATTERY: &str = "Your battery is currently at 87% with a temperature of 32°C. This is within normal \
operating range. However, I notice the temperature is slightly elevated. Consider checking if the cooling \
system is functioning properly.";

const BRAKES: &str = "CRITICAL ALERT: Your brake system shows only 15% efficiency. This requires immediate \
attention. Please schedule a service appointment as soon as possible. The brake pads appear to be worn and \
need replacement.";

const ENGINE: &str = "Engine temperature is currently 195°F, which is within normal range. Oil pressure is \
good at 45 PSI. No immediate issues detected with the engine system.";

const TIRES: &str = "Tire pressure is at 31 PSI, which is slightly below optimal (32-35 PSI). Consider \
inflating your tires to improve fuel efficiency and safety.";

const MAINTENANCE: &str = "Based on current diagnostics, here's what needs attention: 1) URGENT: Brake pad \
replacement, 2) Minor: Tire pressure adjustment, 3) Monitor: Battery temperature. Next scheduled \
maintenance: Oil change in 2,000 miles.";

const CLARIFY: &str = "I understand you're asking about your vehicle. Could you be more specific? I can help \
with battery status, engine diagnostics, brake system, tire pressure, or general maintenance \
recommendations.";

/// Topic keywords checked in order; the first hit answers
const TOPICS: &[(&[&str], &str)] = &[
    (&["battery"], BATTERY),
    (&["brake"], BRAKES),
    (&["engine"], ENGINE),
    (&["tire", "pressure"], TIRES),
    (&["maintenance", "service"], MAINTENANCE),
];

pub fn respond(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(CLARIFY)
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTranscript {
    pub messages: Vec<ChatMessage>,
    pub composing: bool,
}

/// A single conversation.
///
/// Replies land after a fixed delay that cannot be cancelled. Sends are not
/// serialized, so quick successive messages each get their own reply in
/// arrival order of their timers.
#[derive(Clone)]
pub struct ChatSession {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    pending: Arc<AtomicUsize>,
    delay: Duration,
}

impl ChatSession {
    pub fn new(delay: Duration) -> Self {
        Self {
            messages: Arc::new(Mutex::new(vec![ChatMessage::assistant(GREETING)])),
            pending: Arc::new(AtomicUsize::new(0)),
            delay,
        }
    }

    /// Append the user's message and schedule the reply.
    /// Blank input is ignored and returns `None`.
    pub async fn send(&self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        let message = ChatMessage::user(text);
        self.messages.lock().await.push(message.clone());
        self.pending.fetch_add(1, Ordering::SeqCst);

        let reply = respond(text);
        let messages = Arc::clone(&self.messages);
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            messages.lock().await.push(ChatMessage::assistant(reply));
            pending.fetch_sub(1, Ordering::SeqCst);
        });

        Some(message)
    }

    pub fn composing(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub async fn transcript(&self) -> ChatTranscript {
        ChatTranscript {
            messages: self.messages.lock().await.clone(),
            composing: self.composing(),
        }
    }
}
