//! Scripted study assistant.
//!
//! Replies come from an ordered rule list; the first rule whose keywords
//! appear in the lowercased message wins. More specific intents are listed
//! before generic ones ("study plan" before "help").

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Assignment, Subject};
use crate::schedule::{self, DEFAULT_UPCOMING_LIMIT};

pub const GREETING: &str = "Hi! I'm your study assistant. I can help with study tips, schedule \
optimization, assignment planning and general academic advice. How can I help you today?";

/// Counts and names the templates draw on.
#[derive(Debug, Clone)]
pub struct AssistantContext {
    pub total_subjects: usize,
    pub upcoming_assignments: usize,
    pub today_classes: usize,
    pub subject_names: Vec<String>,
    pub subject_days: Vec<String>,
}

impl AssistantContext {
    pub fn build(subjects: &[Subject], assignments: &[Assignment], today: NaiveDate) -> Self {
        let upcoming = schedule::upcoming_assignments(assignments, today, DEFAULT_UPCOMING_LIMIT);
        let todays = schedule::subjects_for_day(subjects, schedule::today_weekday(today));
        Self {
            total_subjects: subjects.len(),
            upcoming_assignments: upcoming.len(),
            today_classes: todays.len(),
            subject_names: subjects.iter().map(|s| s.name.clone()).collect(),
            subject_days: subjects.iter().map(|s| s.day.to_string()).collect(),
        }
    }

    fn first_subjects(&self) -> impl Iterator<Item = (&str, &str)> {
        self.subject_names
            .iter()
            .zip(self.subject_days.iter())
            .take(3)
            .map(|(n, d)| (n.as_str(), d.as_str()))
    }
}

pub struct Rule {
    pub intent: &'static str,
    pub keywords: &'static [&'static str],
    pub respond: fn(&AssistantContext) -> String,
}

impl Rule {
    fn matches(&self, input: &str) -> bool {
        self.keywords.iter().any(|k| input.contains(k))
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        intent: "study_plan",
        keywords: &["study plan", "plan"],
        respond: study_plan,
    },
    Rule {
        intent: "time_management",
        keywords: &["time management", "schedule", "organize"],
        respond: time_management,
    },
    Rule {
        intent: "study_tips",
        keywords: &["study tips", "techniques", "how to study"],
        respond: study_tips,
    },
    Rule {
        intent: "motivation",
        keywords: &["overwhelmed", "stressed", "motivation", "help"],
        respond: motivation,
    },
    Rule {
        intent: "assignments",
        keywords: &["assignment", "homework", "due"],
        respond: assignments,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct QuickAction {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const QUICK_ACTIONS: [QuickAction; 4] = [
    QuickAction {
        label: "Study Plan",
        prompt: "Create a study plan for my upcoming assignments",
    },
    QuickAction {
        label: "Time Management",
        prompt: "Give me time management tips for my current schedule",
    },
    QuickAction {
        label: "Study Tips",
        prompt: "What are some effective study techniques for my subjects?",
    },
    QuickAction {
        label: "Motivation",
        prompt: "I'm feeling overwhelmed with my assignments. Can you help motivate me?",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub intent: &'static str,
    pub text: String,
}

pub fn respond(message: &str, ctx: &AssistantContext) -> Reply {
    let input = message.to_lowercase();
    RULES
        .iter()
        .find(|r| r.matches(&input))
        .map(|r| Reply {
            intent: r.intent,
            text: (r.respond)(ctx),
        })
        .unwrap_or_else(|| Reply {
            intent: "general",
            text: general(ctx),
        })
}

fn study_plan(ctx: &AssistantContext) -> String {
    if ctx.upcoming_assignments == 0 {
        return "You have no upcoming assignments, so this is a good time to review and get ahead:\n\n\
1. Review notes from recent classes\n\
2. Read ahead in your textbooks\n\
3. Work practice problems from earlier chapters\n\
4. Organize your study materials\n\n\
Want tips for a particular subject?"
            .to_string();
    }

    let per_subject: Vec<String> = ctx
        .first_subjects()
        .map(|(name, day)| format!("- {}: schedule study time after your {} class", name, day))
        .collect();

    format!(
        "Here's a study plan based on your schedule.\n\n\
Priority focus: you have {} upcoming assignments.\n\n\
This week:\n\
1. Start with high-priority assignments\n\
2. Set aside 2-3 hours a day for focused study\n\
3. Work in 25 minute blocks with 5 minute breaks\n\
4. Review class notes within 24 hours of each lecture\n\n\
By subject:\n{}\n\n\
Want me to break this down for a specific subject?",
        ctx.upcoming_assignments,
        per_subject.join("\n")
    )
}

fn time_management(ctx: &AssistantContext) -> String {
    format!(
        "Some time management strategies for your schedule:\n\n\
Daily structure:\n\
- You have {} classes today; plan study blocks between them\n\
- Use the gaps between classes for quick reviews\n\
- Fix specific times for assignment work\n\n\
Weekly planning:\n\
- Plan the coming week every Sunday\n\
- Review your {} subjects and upcoming deadlines\n\
- Block time per subject by difficulty and deadline\n\n\
Also: batch similar tasks, leave buffer time, and take regular breaks.\n\n\
What time management challenge are you facing?",
        ctx.today_classes, ctx.total_subjects
    )
}

fn subject_advice(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.contains("math") || lower.contains("calculus") {
        "practice problems daily and focus on understanding the concepts"
    } else if lower.contains("history") || lower.contains("literature") {
        "build timelines, summarize key points and discuss with peers"
    } else if lower.contains("science") || lower.contains("biology") {
        "use diagrams, draw concept maps and review your labs"
    } else {
        "take detailed notes, write study guides and form a study group"
    }
}

fn study_tips(ctx: &AssistantContext) -> String {
    let per_subject: Vec<String> = ctx
        .first_subjects()
        .map(|(name, _)| format!("- {}: {}", name, subject_advice(name)))
        .collect();

    format!(
        "Effective study techniques for your subjects:\n\n\
Active learning:\n\
- Spaced repetition: review material at increasing intervals\n\
- Active recall: test yourself without looking at your notes\n\
- Feynman technique: explain the idea in simple terms\n\n\
By subject:\n{}\n\n\
Environment: a quiet dedicated space, no phone, good light.\n\n\
Which subject would you like strategies for?",
        per_subject.join("\n")
    )
}

fn motivation(ctx: &AssistantContext) -> String {
    format!(
        "Feeling overwhelmed is normal, and you can get back in control.\n\n\
Right now:\n\
- Take five slow breaths\n\
- Break big tasks into small steps and do only the next one\n\n\
Perspective:\n\
- {} subjects is manageable\n\
- {} upcoming assignments can be handled with a plan\n\
- Your instructors want you to succeed\n\n\
Look after sleep, exercise and food, and reward yourself for finished tasks.\n\n\
What's worrying you most right now?",
        ctx.total_subjects, ctx.upcoming_assignments
    )
}

fn assignments(ctx: &AssistantContext) -> String {
    if ctx.upcoming_assignments == 0 {
        return "No upcoming assignments right now. Good moment to:\n\n\
- Get ahead on reading\n\
- Review and organize your notes\n\
- Prepare for upcoming exams\n\
- Make progress on long-term projects"
            .to_string();
    }

    format!(
        "Let's plan your assignments.\n\n\
Current workload: {} assignments to complete, high priority first.\n\n\
1. Start with whatever is due soonest\n\
2. Spend 2-3 hours a day on assignment work\n\
3. Review progress weekly and adjust\n\n\
Keep time for all {} subjects, not only the ones with close deadlines.\n\n\
Which assignment worries you most?",
        ctx.upcoming_assignments, ctx.total_subjects
    )
}

fn general(ctx: &AssistantContext) -> String {
    format!(
        "Here's where you stand:\n\n\
- {} subjects this semester\n\
- {} upcoming assignments\n\
- {} classes today\n\n\
Keep a consistent routine, use office hours, and look after yourself.\n\n\
I can help with a study schedule, subject strategies, stress and motivation, \
or assignment priorities. What would help most?",
        ctx.total_subjects, ctx.upcoming_assignments, ctx.today_classes
    )
}
