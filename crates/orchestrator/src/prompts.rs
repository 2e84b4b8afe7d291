pub struct StepPrompts;

impl StepPrompts {
    /// Query sent to the retrieval service for a topic.
    pub fn research_query(topic: &str) -> String {
        format!("film industry trends and market analysis for {}", topic)
    }

    pub fn first_draft(topic: &str, research: &str) -> String {
        format!(
            r#"You are a professional screenwriter. Create a film script outline based on this topic and research.

Topic: {topic}

Research:
{research}

Write a detailed script outline including:
- Title
- Three-act structure with descriptions
- Main characters
- Key plot points
- Themes

Make it creative, marketable, and compelling."#,
            topic = topic,
            research = research
        )
    }

    pub fn revision(topic: &str, research: &str, feedback: &str) -> String {
        format!(
            r#"You are a professional screenwriter revising a script. The previous version received this feedback:

FEEDBACK: {feedback}

Topic: {topic}

Research:
{research}

Create an IMPROVED script outline that addresses the feedback. Include:
- Title
- Main characters
- Key plot points
- Themes

Focus on improving the areas mentioned in the feedback while maintaining strong plot and marketability."#,
            feedback = feedback,
            topic = topic,
            research = research
        )
    }

    pub fn review(script: &str) -> String {
        format!(
            r#"You are a film industry reviewer. Evaluate this script and provide:
1. A rating from 1-10 based on plot quality and marketability
2. Brief feedback (2-3 sentences) on what needs improvement

Do not be too harsh of a critic
Script:
{script}

Format your response as:
RATING: [number]
FEEDBACK: [your feedback here]"#,
            script = script
        )
    }
}
