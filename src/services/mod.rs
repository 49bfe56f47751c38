//! External collaborators: speech synthesis and script generation.

/// Script generation behind a status-coded request/response surface.
pub mod script;
/// Speech synthesis for segment text.
pub mod speech;

pub use script::{
    OpenAiScriptGenerator, ScriptError, ScriptGenerator, ScriptRequest, ScriptResponse,
    ScriptService, ServiceResponse,
};
pub use speech::{MockSpeech, PiperSpeech, SpeechSynthesizer, synthesize_missing};
