//! Demo content shown when offline fallback has nothing better.

use super::{Dream, DreamId, DreamStatus};

fn sample(title: &str, description: &str, status: DreamStatus, tags: &[&str]) -> Dream {
    let mut dream = Dream::placeholder(
        title,
        description,
        status,
        tags.iter().map(|t| t.to_string()).collect(),
    );
    dream.id = DreamId::sample();
    dream
}

impl Dream {
    pub fn showcase() -> Vec<Dream> {
        vec![
            sample(
                "Cloud-Sea Glass Garden",
                "A liquid-glass greenhouse drifting above the clouds; starlight plants flicker with every breath.",
                DreamStatus::Completed,
                &["dreamscape", "nature"],
            ),
            sample(
                "Neon Meteor Knight",
                "A steampunk knight racing through a neon maze, cape woven from meteor light.",
                DreamStatus::Completed,
                &["character", "cyberpunk"],
            ),
            sample(
                "Ink Dragon Spirit",
                "A dragon spirit waking from eastern ink wash, circled by the sound of ancient bells.",
                DreamStatus::Completed,
                &["eastern", "myth"],
            ),
        ]
    }

    pub fn pending_samples() -> Vec<Dream> {
        vec![
            sample(
                "Interstellar Train",
                "A transparent train carrying memory fragments across the galaxy.",
                DreamStatus::Processing,
                &["travel", "sci-fi"],
            ),
            sample(
                "Forest Light",
                "Antlers and fireflies weaving through a misty morning forest.",
                DreamStatus::Pending,
                &["nature", "healing"],
            ),
        ]
    }
}
