//! Prompt templates.

use text_gen_sdk::DifficultyLabel;

pub fn explain_discomfort(user_likes: &[String], recommendation: &str, domain: &str) -> String {
    format!(
        "You are a cultural mentor helping someone expand their taste.\n\
         A user who likes {likes} in {domain} is being recommended \"{recommendation}\" which is very different from their usual preferences.\n\n\
         Explain in 2-3 sentences why experiencing this different content would be valuable for their cultural growth. \
         Be encouraging but honest about the challenge.\n\n\
         Format: Keep it conversational and inspiring.",
        likes = join_or(user_likes, "mainstream picks"),
    )
}

pub fn challenge_task(domain: &str, difficulty: u8) -> String {
    let label = DifficultyLabel::for_level(difficulty).as_str();
    format!(
        "Generate a {domain} cultural exploration challenge for difficulty level {difficulty}/5 ({label}).\n\n\
         The challenge should:\n\
         - Be specific and actionable\n\
         - Push cultural boundaries appropriately for the difficulty level\n\
         - Be respectful of all cultures\n\
         - Include clear cultural learning value\n\n\
         Return in this JSON format:\n\
         {{\n  \"title\": \"Challenge title\",\n  \"description\": \"What the user needs to do\",\n  \"culturalContext\": \"Why this is culturally enriching\"\n}}\n\n\
         Make it specific, doable, and culturally educational. Avoid stereotypes and focus on authentic cultural experiences."
    )
}

pub fn curriculum_plan(current: &[String], target: &[String], domain: &str) -> String {
    format!(
        "Create a 5-step cultural journey plan for someone who currently enjoys {current} in {domain} \
         and wants to gradually appreciate {target}.\n\n\
         Provide a progressive path with titles and brief explanations for each step.\n\
         Make it feel like an exciting adventure, not homework.\n\n\
         Format as a numbered list with brief explanations.",
        current = join_or(current, "familiar favourites"),
        target = join_or(target, "something new"),
    )
}

pub fn progress_insight(previous_score: u32, current_score: u32, completed: &[String]) -> String {
    format!(
        "A user's cultural exposure score increased from {previous_score} to {current_score}.\n\
         They recently completed these challenges: {completed}.\n\n\
         Write an encouraging 2-sentence insight about their cultural growth journey.\n\
         Be specific about their progress and motivate them to continue exploring.",
        completed = join_or(completed, "none yet"),
    )
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_owned()
    } else {
        items.join(", ")
    }
}
