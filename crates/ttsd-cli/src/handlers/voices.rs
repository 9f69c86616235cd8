//! Voices command handler.

use anyhow::Result;

use ttsd_voice::{VoiceInfo, available_voices};

/// Print the voice catalogue of the compiled backend as pretty JSON.
pub fn execute() -> Result<()> {
    println!("{}", voices_json(&available_voices())?);
    Ok(())
}

/// Render a voice list as pretty-printed JSON.
pub fn voices_json(voices: &[VoiceInfo]) -> Result<String> {
    Ok(serde_json::to_string_pretty(voices)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttsd_voice::VoiceGender;

    #[test]
    fn voices_render_as_json_array() {
        let voices = vec![VoiceInfo {
            id: "bf_emma".to_string(),
            name: "Emma".to_string(),
            category: "British English".to_string(),
            gender: VoiceGender::Female,
        }];

        let json: serde_json::Value = serde_json::from_str(&voices_json(&voices).unwrap()).unwrap();

        assert_eq!(json[0]["id"], "bf_emma");
        assert_eq!(json[0]["gender"], "female");
    }

    #[test]
    fn empty_catalogue_is_empty_array() {
        assert_eq!(voices_json(&[]).unwrap(), "[]");
    }
}
