use std::io::{self, Write};

use crate::engine::fishing::FishingPhase;
use crate::engine::model::Card;
use crate::render::{ColorMode, RenderMode};

/// What the bottom status bar reports.
pub struct Status<'a> {
    pub pond: &'a str,
    pub ready: usize,
    pub total: usize,
    pub phase: FishingPhase,
    pub paused: bool,
    pub fps: f64,
    pub render: RenderMode,
    pub color: ColorMode,
}

/// Status bar text, truncated or padded to exactly `width` chars.
pub fn status_line(s: &Status<'_>, width: usize) -> String {
    let paused = if s.paused { " [PAUSED]" } else { "" };
    let text = format!(
        " {} | {}/{} ready | {} | {:?} | {:?} | {:.0} fps{} | [←/→] move  [space] cast  [p] pause  [h] hide  [q] quit ",
        s.pond,
        s.ready,
        s.total,
        s.phase.label(),
        s.render,
        s.color,
        s.fps,
        paused,
    );
    let truncated: String = text.chars().take(width).collect();
    format!("{:<width$}", truncated, width = width)
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        let len = line.chars().count();
        if len > 0 && len + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn boxed(inner: &str, inner_width: usize) -> String {
    let pad = inner_width.saturating_sub(inner.chars().count());
    format!("│ {inner}{} │", " ".repeat(pad))
}

/// Framed review dialog for a landed card, at most `max_width` chars wide.
pub fn dialog_lines(title: &str, card: &Card, revealed: bool, max_width: usize) -> Vec<String> {
    const HINT_HIDDEN: &str = "[enter] reveal  [esc] release";
    const HINT_SHOWN: &str = "grade [0-5]  [esc] release";

    let answer = if revealed { card.answer.as_str() } else { "· · ·" };
    let natural = [title, card.prompt.as_str(), answer, HINT_HIDDEN]
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0);
    let inner = natural.min(max_width.saturating_sub(4)).max(8);

    let mut lines = Vec::new();
    let title: String = title.chars().take(inner.saturating_sub(2)).collect();
    let rule = inner + 2 - title.chars().count() - 2;
    lines.push(format!("┌ {title} {}┐", "─".repeat(rule)));
    lines.extend(wrap(&card.prompt, inner).iter().map(|l| boxed(l, inner)));
    lines.push(boxed("", inner));
    lines.extend(wrap(answer, inner).iter().map(|l| boxed(l, inner)));
    lines.push(format!("├{}┤", "─".repeat(inner + 2)));
    let hint = if revealed { HINT_SHOWN } else { HINT_HIDDEN };
    lines.extend(wrap(hint, inner).iter().map(|l| boxed(l, inner)));
    lines.push(format!("└{}┘", "─".repeat(inner + 2)));
    lines
}

/// Draw `lines` centered on a `cols` x `rows` screen.
pub fn write_centered<W: Write>(out: &mut W, lines: &[String], cols: usize, rows: usize) -> io::Result<()> {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let left = cols.saturating_sub(width) / 2 + 1;
    let top = rows.saturating_sub(lines.len()) / 2 + 1;
    for (i, line) in lines.iter().enumerate() {
        write!(out, "\x1b[{};{}H\x1b[0m{}", top + i, left, line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(prompt: &str, answer: &str) -> Card {
        Card {
            id: 1,
            prompt: prompt.into(),
            answer: answer.into(),
            depth_level: 0,
            next_review_date: Utc::now(),
        }
    }

    #[test]
    fn status_fills_width_exactly() {
        let s = Status {
            pond: "Kanji",
            ready: 3,
            total: 10,
            phase: FishingPhase::Luring,
            paused: true,
            fps: 23.7,
            render: RenderMode::HalfBlock,
            color: ColorMode::TrueColor,
        };
        let line = status_line(&s, 200);
        assert_eq!(line.chars().count(), 200);
        assert!(line.contains("3/10 ready"));
        assert!(line.contains("luring"));
        assert!(line.contains("[PAUSED]"));
        assert_eq!(status_line(&s, 12).chars().count(), 12);
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over"]);
        assert_eq!(wrap("abcdefghij12", 5), vec!["abcde", "fghij", "12"]);
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn dialog_hides_answer_until_revealed() {
        let c = card("capital of Peru?", "Lima");
        let hidden = dialog_lines("Capitals", &c, false, 80).join("\n");
        assert!(hidden.contains("capital of Peru?"));
        assert!(!hidden.contains("Lima"));
        assert!(hidden.contains("[enter] reveal"));

        let shown = dialog_lines("Capitals", &c, true, 80).join("\n");
        assert!(shown.contains("Lima"));
        assert!(shown.contains("grade [0-5]"));
    }

    #[test]
    fn dialog_rows_share_one_width() {
        let c = card("a rather long prompt that will need to wrap inside a narrow box", "short");
        let lines = dialog_lines("Pond", &c, true, 30);
        let width = lines[0].chars().count();
        assert!(width <= 30);
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn centered_output_positions_each_row() {
        let mut out = Vec::new();
        let lines = vec!["abcd".to_string(), "efgh".to_string()];
        write_centered(&mut out, &lines, 10, 6).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[3;4H\x1b[0mabcd"));
        assert!(text.contains("\x1b[4;4H\x1b[0mefgh"));
    }
}
