use crate::models::AudioFile;

const ENGLISH_TEXT: &str = "In the ancient land of Eldoria, where skies shimmered and forests, \
whispered secrets to the wind, lived a dragon named Zephyros. [sarcastically] Not the \"burn it \
all down\" kind... [giggles] but he was gentle, wise, with eyes like old stars. [whispers] Even \
the birds fell silent when he passed.";

const ARABIC_TEXT: &str = "في أرض إلدوريا القديمة، حيث تتألق السماء وتهمس الغابات بأسرارها للريح، \
عاش تنين يُدعى زيفيروس. ليس من النوع الذي يحرق كل شيء... بل كان لطيفاً وحكيماً، بعيون مثل النجوم \
القديمة. حتى الطيور كانت تصمت عندما يمر.";

/// Entries a fresh catalog starts with
pub fn sample_entries() -> Vec<AudioFile> {
    vec![
        AudioFile {
            id: "english_audio".to_string(),
            language: "english".to_string(),
            audio_url: "https://www.soundjay.com/misc/sounds/bell-ringing-05.wav".to_string(),
            text_content: ENGLISH_TEXT.to_string(),
        },
        AudioFile {
            id: "arabic_audio".to_string(),
            language: "arabic".to_string(),
            audio_url: "https://www.soundjay.com/misc/sounds/bell-ringing-04.wav".to_string(),
            text_content: ARABIC_TEXT.to_string(),
        },
    ]
}
