pub(crate) fn severity_prompt(incident_type: &str, description: &str, taluk: &str) -> String {
    format!(
        "You are an AI assistant tasked with assessing the severity of incidents for emergency response prioritization.

Analyze the following incident details:
- Type: {incident_type}
- Description: {description}
- Location: {taluk}

Rate the severity of this incident on a scale of 1 to 5, where:
1 = Minor incident with minimal impact
2 = Low severity with limited disruption
3 = Moderate severity requiring attention
4 = High severity with significant impact
5 = Critical emergency requiring immediate response

Provide your response in this exact format:
{{\"score\": [1-5], \"explanation\": \"[One sentence explanation for the rating]\"}}"
    )
}

pub(crate) const IMAGE_COMPARISON_PROMPT: &str = r#"You are an AI assistant tasked with analyzing before and after images of an incident site.

Image 1: BEFORE the resolution attempt.
Image 2: AFTER the resolution attempt.

Compare these images and determine if the incident has been addressed in any way.

IMPORTANT: Consider the incident as "resolved" even if only a partial or temporary solution has been implemented.
Any visible attempt to address the issue, even if not completely fixed, should be marked as resolved = true.

Respond ONLY with a valid JSON object in this exact format:

{
  "resolved": boolean,
  "description": string,
  "confidence": number
}

- "resolved": true if ANY attempt to resolve the issue is visible, even if partial or temporary
- "description": brief description of what changed; call out partial or temporary fixes explicitly, and if nothing changed explain why no resolution attempt is visible
- "confidence": your confidence in this assessment, from 0.0 to 1.0

Do not include any explanatory text outside the JSON object."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_prompt_embeds_incident_details_and_format() {
        let prompt = severity_prompt("Fire", "Smoke from market roof", "Puttur");
        assert!(prompt.contains("- Type: Fire"));
        assert!(prompt.contains("- Description: Smoke from market roof"));
        assert!(prompt.contains("- Location: Puttur"));
        assert!(prompt.contains(r#"{"score": [1-5], "explanation":"#));
    }

    #[test]
    fn comparison_prompt_requests_all_fields() {
        for field in ["\"resolved\"", "\"description\"", "\"confidence\""] {
            assert!(IMAGE_COMPARISON_PROMPT.contains(field));
        }
    }
}
