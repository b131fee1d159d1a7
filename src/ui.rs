use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use assessr::{diff::CharacterComparison, reconciler::SubmissionStatus, session::Phase};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let assessment = &self.assessment;
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);

        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let banner_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC);

        let reference = assessment.reference_text().unwrap_or_default();

        match assessment.phase() {
            Phase::Idle => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Length(1), // title
                        Constraint::Length(1),
                        Constraint::Min(1), // instructions
                        Constraint::Length(1), // duration picker
                        Constraint::Length(1), // banner
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let (title, instructions) = assessment
                    .test()
                    .map(|t| (t.test_id.as_str(), t.instructions.as_str()))
                    .unwrap_or(("no test loaded", ""));

                Paragraph::new(Span::styled(title, bold_style))
                    .alignment(Alignment::Center)
                    .render(chunks[0], buf);

                Paragraph::new(Span::styled(instructions, italic_style))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[2], buf);

                Paragraph::new(Span::styled(
                    format!("< {}s >", self.duration_secs),
                    bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);

                if let Some(banner) = &self.banner {
                    Paragraph::new(Span::styled(banner.as_str(), banner_style))
                        .alignment(Alignment::Center)
                        .render(chunks[4], buf);
                }

                Paragraph::new(Span::styled(
                    "(enter) start / (←→) duration / (esc)ape",
                    italic_style,
                ))
                .render(chunks[5], buf);
            }
            Phase::Running => {
                let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
                let mut prompt_occupied_lines =
                    ((reference.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;

                if reference.width() <= max_chars_per_line as usize {
                    prompt_occupied_lines = 1;
                }

                let padding = area.height.saturating_sub(prompt_occupied_lines) / 2;
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Length(padding.saturating_sub(2)),
                        Constraint::Length(2), // timer
                        Constraint::Length(prompt_occupied_lines),
                        Constraint::Length(2), // live metrics
                        Constraint::Min(0),
                    ])
                    .split(area);

                let mut typed = assessment.typed_text().chars();
                let spans = reference
                    .chars()
                    .zip(assessment.comparisons())
                    .map(|(expected, comparison)| {
                        let actual = typed.next();
                        match comparison {
                            CharacterComparison::Correct => {
                                Span::styled(expected.to_string(), green_bold_style)
                            }
                            CharacterComparison::Incorrect => Span::styled(
                                match actual {
                                    Some(' ') => "·".to_owned(),
                                    Some(c) => c.to_string(),
                                    None => expected.to_string(),
                                },
                                red_bold_style,
                            ),
                            CharacterComparison::Current => {
                                Span::styled(expected.to_string(), underlined_dim_bold_style)
                            }
                            CharacterComparison::Pending => {
                                Span::styled(expected.to_string(), dim_bold_style)
                            }
                        }
                    })
                    .collect::<Vec<Span>>();

                Paragraph::new(Line::from(spans))
                    .alignment(if prompt_occupied_lines == 1 {
                        // when the prompt is small enough to fit on one line
                        // centering the text gives a nice zen feeling
                        Alignment::Center
                    } else {
                        Alignment::Left
                    })
                    .wrap(Wrap { trim: true })
                    .render(chunks[2], buf);

                Paragraph::new(Span::styled(
                    format!("{}", assessment.remaining_seconds().unwrap_or_default()),
                    dim_bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);

                let metrics = assessment.metrics();
                Paragraph::new(Span::styled(
                    format!(
                        "{} wpm   {}% acc   {} err   {} bksp",
                        metrics.wpm,
                        metrics.accuracy_percent,
                        metrics.error_count,
                        metrics.backspace_count
                    ),
                    italic_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
            }
            Phase::Completed => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Min(1),
                        Constraint::Length(1), // stats
                        Constraint::Length(1), // detail
                        Constraint::Length(1), // submission
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let metrics = assessment.metrics();
                Paragraph::new(Span::styled(
                    format!("{} wpm   {}% acc", metrics.wpm, metrics.accuracy_percent),
                    bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);

                let elapsed = assessment
                    .session()
                    .map(|s| s.elapsed_seconds())
                    .unwrap_or_default();
                let trigger = assessment
                    .completed_by()
                    .map(|t| t.to_string())
                    .unwrap_or_default();
                Paragraph::new(Span::styled(
                    format!(
                        "{} correct / {} typed   {} errors   {} backspaces   {}s ({})",
                        metrics.correct_character_count,
                        metrics.total_typed_character_count,
                        metrics.error_count,
                        metrics.backspace_count,
                        elapsed,
                        trigger
                    ),
                    dim_bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);

                let (status_text, status_style) = match assessment.submission_status() {
                    Some(SubmissionStatus::Succeeded) => {
                        ("result submitted".to_string(), green_bold_style)
                    }
                    Some(SubmissionStatus::Failed) => (
                        format!(
                            "submission failed: {} (your score is saved locally)",
                            assessment.submission_message().unwrap_or("unknown error")
                        ),
                        banner_style,
                    ),
                    Some(SubmissionStatus::Pending) | None => {
                        ("submitting…".to_string(), italic_style)
                    }
                };
                Paragraph::new(Span::styled(status_text, status_style))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[3], buf);

                Paragraph::new(Span::styled("(tab) restart / (esc)ape", italic_style))
                    .render(chunks[5], buf);
            }
        }
    }
}
