use roomsvital_core::RoomId;

/// A question put to the user before a destructive write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Overwrite { id: RoomId },
    Delete { id: RoomId },
}

impl Prompt {
    pub fn title(&self) -> String {
        match self {
            Prompt::Overwrite { id } => format!("Room {id} exists"),
            Prompt::Delete { .. } => "Are you sure?".to_string(),
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Prompt::Overwrite { .. } => "Do you want to overwrite the record?",
            Prompt::Delete { .. } => "You won't be able to revert this.",
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match self {
            Prompt::Overwrite { .. } => "Overwrite",
            Prompt::Delete { .. } => "Yes, delete it!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Decline,
}

/// Answers prompts synchronously.
pub trait Confirmer: Send + Sync {
    fn decide(&self, prompt: &Prompt) -> Decision;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub Decision);

impl Confirmer for FixedDecision {
    fn decide(&self, _prompt: &Prompt) -> Decision {
        self.0
    }
}
