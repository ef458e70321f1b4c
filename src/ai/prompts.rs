//! Prompt text for the three generators.

use crate::ai::concept::MusicConceptParams;

pub fn lyrics_prompt(prompt: &str) -> String {
    format!(
        "You are a professional songwriter. Write lyrics based on the following prompt.\n\
         Format them with clear structure (Verse, Chorus, etc.).\n\n\
         Prompt: {}",
        prompt.trim()
    )
}

pub fn concept_prompt(params: &MusicConceptParams) -> String {
    let mut prompt = format!(
        "You are a music producer assistant. Provide a detailed concept for a music track \
         based on the user's specific requirements.\n\n\
         Parameters:\n\
         - Genre: {}\n\
         - Mood: {}\n\
         - Tempo/BPM: {}\n\
         - Musical Key: {}\n\
         - Preferred Instrumentation: {}\n\
         - Additional Context/Description: {}\n",
        params.genre,
        params.mood,
        params.tempo,
        params.key,
        params.instrumentation.trim(),
        params.description.trim()
    );
    if let Some(signature) = non_blank(params.time_signature.as_deref()) {
        prompt.push_str(&format!("- Time Signature: {}\n", signature));
    }
    if let Some(arrangement) = non_blank(params.arrangement.as_deref()) {
        prompt.push_str(&format!("- Arrangement: {}\n", arrangement));
    }
    prompt
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn voice_profile_prompt(description: &str) -> String {
    format!(
        "Analyze the following voice description and create a technical profile summary \
         for a vocal synthesizer.\n\
         Focus on timbre, pitch range, and character.\n\n\
         Description: {}",
        description.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_input() {
        assert!(lyrics_prompt("  rainy city ").ends_with("Prompt: rainy city"));
        assert!(voice_profile_prompt("raspy alto").contains("Description: raspy alto"));

        let prompt = concept_prompt(&MusicConceptParams::default());
        assert!(prompt.contains("- Genre: Electronic"));
        assert!(prompt.contains("- Tempo/BPM: Medium (90-110 BPM)"));
        assert!(!prompt.contains("Time Signature"));
        assert!(!prompt.contains("Arrangement"));
    }

    #[test]
    fn test_concept_prompt_optional_lines() {
        let params = MusicConceptParams {
            time_signature: Some("6/8".to_string()),
            arrangement: Some("  ".to_string()),
            ..MusicConceptParams::default()
        };
        let prompt = concept_prompt(&params);
        assert!(prompt.contains("- Time Signature: 6/8"));
        assert!(!prompt.contains("Arrangement"));
    }
}
