//! Study assistant with keyword-matched canned replies.
//!
//! Replies are picked by the first topic whose keywords occur in the
//! lower-cased message; there is no language understanding.

use crate::model::profile::UserProfile;
use once_cell::sync::Lazy;
use regex::Regex;

/// Topic a message was matched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantTopic {
    Progress,
    Planning,
    Goals,
    Resources,
    Tips,
    Struggling,
    General,
}

struct TopicRule {
    topic: AssistantTopic,
    pattern: Lazy<Regex>,
}

static RULES: [TopicRule; 6] = [
    TopicRule {
        topic: AssistantTopic::Progress,
        pattern: Lazy::new(|| Regex::new(r"progress|how am i doing").expect("valid progress regex")),
    },
    TopicRule {
        topic: AssistantTopic::Planning,
        pattern: Lazy::new(|| Regex::new(r"plan|schedule|week").expect("valid planning regex")),
    },
    TopicRule {
        topic: AssistantTopic::Goals,
        pattern: Lazy::new(|| Regex::new(r"goal|target").expect("valid goals regex")),
    },
    TopicRule {
        topic: AssistantTopic::Resources,
        pattern: Lazy::new(|| {
            Regex::new(r"resource|recommend|study material").expect("valid resources regex")
        }),
    },
    TopicRule {
        topic: AssistantTopic::Tips,
        pattern: Lazy::new(|| Regex::new(r"tip|advice|help").expect("valid tips regex")),
    },
    TopicRule {
        topic: AssistantTopic::Struggling,
        pattern: Lazy::new(|| {
            Regex::new(r"behind|struggling|difficult").expect("valid struggling regex")
        }),
    },
];

/// Chat assistant returning fixed guidance text.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssistantService;

impl AssistantService {
    pub fn new() -> Self {
        Self
    }

    /// Classifies `message` into a topic.
    pub fn classify(&self, message: &str) -> AssistantTopic {
        let lowered = message.to_lowercase();
        RULES
            .iter()
            .find(|rule| rule.pattern.is_match(&lowered))
            .map_or(AssistantTopic::General, |rule| rule.topic)
    }

    /// Reply text for `message`, personalized with `profile` where relevant.
    pub fn reply(&self, message: &str, profile: Option<&UserProfile>) -> String {
        match self.classify(message) {
            AssistantTopic::Progress => progress_reply(profile),
            AssistantTopic::Planning => PLANNING_REPLY.to_string(),
            AssistantTopic::Goals => goals_reply(profile),
            AssistantTopic::Resources => RESOURCES_REPLY.to_string(),
            AssistantTopic::Tips => TIPS_REPLY.to_string(),
            AssistantTopic::Struggling => STRUGGLING_REPLY.to_string(),
            AssistantTopic::General => GENERAL_REPLY.to_string(),
        }
    }
}

fn progress_reply(profile: Option<&UserProfile>) -> String {
    let streak = profile.map_or(0, |p| p.streak);
    let level = profile.map_or(1, |p| p.level);
    format!(
        "You're at level {level}. Keep working through your planned tasks and review \
         the subjects with the lowest progress first. Your current streak is {streak} days - keep it up!"
    )
}

fn goals_reply(profile: Option<&UserProfile>) -> String {
    let goals: Vec<String> = profile
        .map(|p| {
            let courses = p
                .courses
                .iter()
                .map(|course| format!("- {}: {}% complete", course.name, course.progress));
            let exams = p
                .exams
                .iter()
                .map(|exam| format!("- {} (exam {}): {}% complete", exam.name, exam.target_date, exam.progress));
            courses.chain(exams).collect()
        })
        .unwrap_or_default();

    if goals.is_empty() {
        return "You haven't set any goals yet. Add a course or exam and I'll help you track it.".to_string();
    }
    format!("Your current goals:\n\n{}", goals.join("\n"))
}

const PLANNING_REPLY: &str = "I can help you plan your week! Block focused sessions for \
your weakest subject early in the week, alternate practice and revision days, and keep one \
slot for a mock test. Would you like me to add these to your calendar?";

const RESOURCES_REPLY: &str = "Here are some ways to find good study material: start from \
your course syllabus, look for well-rated lecture playlists, and use past papers for exam \
practice. Would you like more specific resources for any topic?";

const TIPS_REPLY: &str = "Here are some study tips:\n\n\
- Active Recall: test yourself instead of re-reading\n\
- Spaced Repetition: review topics at increasing intervals\n\
- Pomodoro Technique: study in 25-minute focused sessions\n\
- Practice Tests: take mock exams weekly to track progress";

const STRUGGLING_REPLY: &str = "I understand you're facing some challenges. Prioritize \
high-weightage topics, reschedule what you missed, consider a study group, and celebrate \
small wins. Would you like me to create a catch-up plan for you?";

const GENERAL_REPLY: &str = "I'm here to help with your learning journey! I can assist with \
study planning, progress tracking, resource recommendations, and questions about your \
courses. What would you like help with?";

#[cfg(test)]
mod tests {
    use super::{AssistantService, AssistantTopic};

    #[test]
    fn first_matching_topic_wins() {
        let assistant = AssistantService::new();
        assert_eq!(assistant.classify("How am I doing?"), AssistantTopic::Progress);
        // "plan" is checked before "help".
        assert_eq!(assistant.classify("Help me plan"), AssistantTopic::Planning);
        assert_eq!(assistant.classify("I'm STRUGGLING"), AssistantTopic::Struggling);
        assert_eq!(assistant.classify("hello"), AssistantTopic::General);
    }
}
