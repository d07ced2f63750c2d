//! Translate-and-speak session state
//!
//! State container for the screen that takes the captured text, translates it
//! into a chosen language, and synthesizes speech. The translation and speech
//! backends are injected collaborators; this module owns only the state
//! transitions between user actions and their results.

use anyhow::Result;
use tracing::{debug, warn};

/// A synthesis voice offered by the speech collaborator.
///
/// Voice names embed their language code (e.g. "es-ES_SofiaV3Voice"), which is
/// how a chosen voice selects its translation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub language: String,
}

/// A translation target offered by the translation collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// Lists languages and translates text between them
pub trait Translator {
    fn list_languages(&mut self) -> Result<Vec<Language>>;
    fn translate(&mut self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Lists voices and synthesizes audio for text
pub trait SpeechSynthesizer {
    fn list_voices(&mut self) -> Result<Vec<Voice>>;
    fn synthesize(&mut self, text: &str, voice: &str) -> Result<Vec<u8>>;
}

/// User-driven actions on the session
#[derive(Debug, Clone)]
pub enum Action {
    LoadLanguages,
    LoadVoices,
    ChooseVoice(Voice),
    Translate,
    Speak,
}

/// State changes produced by handling an action
#[derive(Debug, Clone)]
pub enum Mutation {
    SetLanguages(Vec<Language>),
    SetVoices(Vec<Voice>),
    SetLanguage(Language),
    SetVoice(Voice),
    SetTranslation(String),
    SetAudio(Vec<u8>),
}

/// Session state: the captured source text plus everything the user picks.
/// `text` is fixed at construction; all other fields change only via `reduce`.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub languages: Vec<Language>,
    pub voices: Vec<Voice>,
    pub selected_language: Option<Language>,
    pub selected_voice: Option<Voice>,
    pub text: String,
    pub translation: String,
    pub audio: Option<Vec<u8>>,
}

impl State {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Apply one mutation, returning the next state
pub fn reduce(state: State, mutation: Mutation) -> State {
    let mut next = state;
    match mutation {
        Mutation::SetLanguages(languages) => next.languages = languages,
        Mutation::SetVoices(voices) => next.voices = voices,
        Mutation::SetLanguage(language) => next.selected_language = Some(language),
        Mutation::SetVoice(voice) => next.selected_voice = Some(voice),
        Mutation::SetTranslation(translation) => next.translation = translation,
        Mutation::SetAudio(audio) => next.audio = Some(audio),
    }
    next
}

/// Drives a translate-and-speak session against injected collaborators
pub struct TranslateSession<T: Translator, S: SpeechSynthesizer> {
    state: State,
    translator: T,
    synthesizer: S,
    source_language: String,
}

impl<T: Translator, S: SpeechSynthesizer> TranslateSession<T, S> {
    pub fn new(
        text: impl Into<String>,
        translator: T,
        synthesizer: S,
        source_language: impl Into<String>,
    ) -> Self {
        Self {
            state: State::new(text),
            translator,
            synthesizer,
            source_language: source_language.into(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Initial loads performed when the session opens
    pub fn start(&mut self) -> Result<()> {
        self.handle(Action::LoadLanguages)?;
        self.handle(Action::LoadVoices)
    }

    /// Handle one action: call collaborators, then fold the resulting
    /// mutations into the state.
    pub fn handle(&mut self, action: Action) -> Result<()> {
        for mutation in self.mutate(action)? {
            self.state = reduce(std::mem::take(&mut self.state), mutation);
        }
        Ok(())
    }

    fn mutate(&mut self, action: Action) -> Result<Vec<Mutation>> {
        match action {
            Action::LoadLanguages => {
                Ok(vec![Mutation::SetLanguages(self.translator.list_languages()?)])
            }
            Action::LoadVoices => {
                Ok(vec![Mutation::SetVoices(self.synthesizer.list_voices()?)])
            }
            Action::ChooseVoice(voice) => {
                let mut mutations = Vec::with_capacity(2);
                mutations.push(Mutation::SetVoice(voice.clone()));
                match self
                    .state
                    .languages
                    .iter()
                    .find(|language| voice.name.contains(&language.code))
                {
                    Some(language) => {
                        debug!(language = %language.name, "voice selected translation target");
                        mutations.push(Mutation::SetLanguage(language.clone()));
                    }
                    None => warn!(voice = %voice.name, "no translation language matches voice"),
                }
                Ok(mutations)
            }
            Action::Translate => {
                let Some(target) = self.state.selected_language.clone() else {
                    warn!("translate requested before a target language was chosen");
                    return Ok(Vec::new());
                };
                let translation = self.translator.translate(
                    &self.state.text,
                    &self.source_language,
                    &target.code,
                )?;
                Ok(vec![Mutation::SetTranslation(translation)])
            }
            Action::Speak => {
                let Some(voice) = self.state.selected_voice.clone() else {
                    return Ok(Vec::new());
                };
                let audio = self
                    .synthesizer
                    .synthesize(&self.state.translation, &voice.name)?;
                Ok(vec![Mutation::SetAudio(audio)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTranslator;

    impl Translator for MockTranslator {
        fn list_languages(&mut self) -> Result<Vec<Language>> {
            Ok(vec![
                Language {
                    code: "es".to_string(),
                    name: "Spanish".to_string(),
                },
                Language {
                    code: "de".to_string(),
                    name: "German".to_string(),
                },
            ])
        }

        fn translate(&mut self, text: &str, source: &str, target: &str) -> Result<String> {
            Ok(format!("[{source}->{target}] {text}"))
        }
    }

    struct MockSynthesizer;

    impl SpeechSynthesizer for MockSynthesizer {
        fn list_voices(&mut self) -> Result<Vec<Voice>> {
            Ok(vec![Voice {
                name: "es-ES_SofiaV3Voice".to_string(),
                language: "es-ES".to_string(),
            }])
        }

        fn synthesize(&mut self, text: &str, _voice: &str) -> Result<Vec<u8>> {
            Ok(text.as_bytes().to_vec())
        }
    }

    fn session() -> TranslateSession<MockTranslator, MockSynthesizer> {
        TranslateSession::new("good morning", MockTranslator, MockSynthesizer, "en")
    }

    #[test]
    fn test_start_loads_languages_and_voices() {
        let mut session = session();
        session.start().unwrap();

        assert_eq!(session.state().languages.len(), 2);
        assert_eq!(session.state().voices.len(), 1);
        assert_eq!(session.state().text, "good morning");
    }

    #[test]
    fn test_choose_voice_selects_matching_language() {
        let mut session = session();
        session.start().unwrap();

        let voice = session.state().voices[0].clone();
        session.handle(Action::ChooseVoice(voice.clone())).unwrap();

        assert_eq!(session.state().selected_voice, Some(voice));
        assert_eq!(
            session.state().selected_language.as_ref().map(|l| l.code.as_str()),
            Some("es")
        );
    }

    #[test]
    fn test_choose_unmatched_voice_keeps_language_unset() {
        let mut session = session();
        session.start().unwrap();

        let voice = Voice {
            name: "xx-XX_NowhereVoice".to_string(),
            language: "xx-XX".to_string(),
        };
        session.handle(Action::ChooseVoice(voice.clone())).unwrap();

        assert_eq!(session.state().selected_voice, Some(voice));
        assert!(session.state().selected_language.is_none());
    }

    #[test]
    fn test_translate_without_target_is_a_no_op() {
        let mut session = session();
        session.handle(Action::Translate).unwrap();

        assert_eq!(session.state().translation, "");
    }

    #[test]
    fn test_translate_uses_selected_target() {
        let mut session = session();
        session.start().unwrap();
        let voice = session.state().voices[0].clone();
        session.handle(Action::ChooseVoice(voice)).unwrap();

        session.handle(Action::Translate).unwrap();

        assert_eq!(session.state().translation, "[en->es] good morning");
    }

    #[test]
    fn test_speak_without_voice_is_a_no_op() {
        let mut session = session();
        session.handle(Action::Speak).unwrap();

        assert!(session.state().audio.is_none());
    }

    #[test]
    fn test_speak_synthesizes_current_translation() {
        let mut session = session();
        session.start().unwrap();
        let voice = session.state().voices[0].clone();
        session.handle(Action::ChooseVoice(voice)).unwrap();
        session.handle(Action::Translate).unwrap();

        session.handle(Action::Speak).unwrap();

        assert_eq!(
            session.state().audio.as_deref(),
            Some("[en->es] good morning".as_bytes())
        );
    }

    #[test]
    fn test_reduce_replaces_only_the_mutated_field() {
        let state = State::new("text");
        let next = reduce(
            state,
            Mutation::SetTranslation("translated".to_string()),
        );

        assert_eq!(next.text, "text");
        assert_eq!(next.translation, "translated");
        assert!(next.audio.is_none());
    }
}
