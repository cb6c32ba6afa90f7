/// One step of the counting routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideStep {
    pub number: u8,
    pub text: String,
}

/// Steps to count fetal kicks, for a given kick target
pub fn counting_steps(kick_target: u32) -> Vec<GuideStep> {
    let texts = [
        "Choose a time when you are least distracted or when you typically feel the fetus move."
            .to_string(),
        "Get comfortable. Lie on your left side or sit with your feet propped up.".to_string(),
        "Place your hands on your belly.".to_string(),
        "Start a timer or watch the clock.".to_string(),
        format!(
            "Count each kick. Keep counting until you get to {} kicks / flutters / swishes / rolls.",
            kick_target
        ),
        format!(
            "Once you reach {} kicks, jot down how many minutes it took.",
            kick_target
        ),
    ];

    texts
        .into_iter()
        .zip(1u8..)
        .map(|(text, number)| GuideStep { number, text })
        .collect()
}
