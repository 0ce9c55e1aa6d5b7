// Multi-language support module
// Provides localized UI strings for English and Chinese with an extensible design

use crate::xtq_game::FeedbackKind;

#[derive(Clone)]
pub struct Assets {
    // Window title
    pub title: &'static str,

    // Status row
    pub lives_label: &'static str,
    pub score_fmt: &'static str,    // "Score: {}"
    pub progress_fmt: &'static str, // "Question {}/{}"

    // Question and answer
    pub question_fmt: &'static str, // "What is {}?"

    // Feedback
    pub fb_correct: &'static str,
    pub fb_wrong_fmt: &'static str, // "Wrong! Answer was {}"
    pub fb_invalid: &'static str,

    // Buttons
    pub btn_submit: &'static str,
    pub btn_play_again: &'static str,

    // Game over screen
    pub over_title: &'static str,
    pub over_score_fmt: &'static str, // "Final Score: {}/{}"

    // Key hints
    pub hint_exit: &'static str,

    // terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2: &'static str,
    pub tsmsg_title: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        title: "Math Challenge",

        lives_label: "Lives: ",
        score_fmt: "Score: {}",
        progress_fmt: "Question {}/{}",

        question_fmt: "What is {}?",

        fb_correct: "Correct!",
        fb_wrong_fmt: "Wrong! Answer was {}",
        fb_invalid: "Please enter a valid number!",

        btn_submit: "Submit",
        btn_play_again: "Play Again",

        over_title: "Game Over!",
        over_score_fmt: "Final Score: {}/{}",

        hint_exit: "Esc: Exit",

        tsmsg_line1: "Terminal size too small.",
        tsmsg_line2: "Minimum required: {} x {}",
        tsmsg_title: "Resize Terminal",
    }
}

/// Returns Chinese language assets
pub fn chinese_assets() -> Assets {
    Assets {
        title: "算术挑战",

        lives_label: "生命：",
        score_fmt: "得分：{}",
        progress_fmt: "第 {}/{} 题",

        question_fmt: "{} 等于多少？",

        fb_correct: "回答正确！",
        fb_wrong_fmt: "回答错误！正确答案是 {}",
        fb_invalid: "请输入有效的数字！",

        btn_submit: "提交",
        btn_play_again: "再玩一次",

        over_title: "游戏结束！",
        over_score_fmt: "最终得分：{}/{}",

        hint_exit: "Esc：退出",

        tsmsg_line1: "终端屏幕布局过小",
        tsmsg_line2: "最小需要尺寸：{} x {}",
        tsmsg_title: "需要调整大小",
    }
}

/// Fill `{}` placeholders in order
pub fn fill(fmt: &str, args: &[&dyn std::fmt::Display]) -> String {
    let mut out = String::with_capacity(fmt.len() + 8);
    let mut rest = fmt;
    for arg in args {
        match rest.find("{}") {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                out.push_str(&arg.to_string());
                rest = &rest[pos + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Main language manager struct
/// Holds the current language code and active string assets
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code
    /// Normalizes input (e.g., "zh-CN" → "zh") and defaults to English for unsupported languages
    pub fn new(lang_code: &str) -> Self {
        let code = if lang_code.to_lowercase().starts_with("zh") {
            "zh"
        } else {
            "en"
        };

        Lang {
            current_lang: code.to_string(),
            assets: if code == "zh" {
                chinese_assets()
            } else {
                english_assets()
            },
        }
    }

    /// Text for a feedback message; the sparkle is dropped in ASCII mode
    pub fn feedback(&self, kind: FeedbackKind, ascii: bool) -> String {
        match kind {
            FeedbackKind::Correct if ascii => self.assets.fb_correct.to_string(),
            FeedbackKind::Correct => format!("{} ✨", self.assets.fb_correct),
            FeedbackKind::Wrong(answer) => fill(self.assets.fb_wrong_fmt, &[&answer]),
            FeedbackKind::Invalid => self.assets.fb_invalid.to_string(),
        }
    }
}
