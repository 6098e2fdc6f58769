use crate::models::RankedResult;

const BAR_WIDTH: usize = 30;

/// Text version of the horizontal results bar chart.
pub fn render_results(results: &[RankedResult]) -> String {
    let mut summary = String::from("Simulated results\n\n");

    let max_votes = results.iter().map(|r| r.votes).max().unwrap_or(0);
    for result in results {
        let filled = if max_votes > 0 {
            (result.votes as f64 / max_votes as f64 * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let glyph = if result.highlighted { "█" } else { "░" };
        let bar = glyph.repeat(filled);
        let marker = if result.highlighted { '*' } else { ' ' };

        summary.push_str(&format!(
            "{} {:<12} {:<width$} {:>5.1}%  {} votes\n",
            marker,
            result.short_name,
            bar,
            result.percentage,
            result.votes,
            width = BAR_WIDTH
        ));
    }

    summary.push_str("\nThese figures come from a local simulation and are not official data.\n");
    summary
}
