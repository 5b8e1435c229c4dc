use crate::agents::Agents;
use crate::game::GameConfig;
use crate::history::History;
use crate::logger::Logger;
use crate::scenarios::budget_pacing;
use plotters::prelude::*;
use std::fs;

/// Play the budget pacing field once and chart how every agent bid and spent
pub fn generate_all_charts() -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all("charts")?;

    let (game, _) = budget_pacing::prepare_game(GameConfig::default().budget);
    let mut logger = Logger::new();
    let history = game.run(&mut logger);

    let bids = bids_per_round(&game.agents, &history);
    create_line_chart(&game.agents, &bids, "Bids per Round", "charts/bids_per_round.png", "Bid per click")?;

    let spend = spend_per_round(&game.agents, &history);
    create_line_chart(&game.agents, &spend, "Cumulative Spend per Round", "charts/spend_per_round.png", "Spent")?;

    Ok(())
}

/// Series of (round, bid) per agent; rounds without a bid are skipped
fn bids_per_round(agents: &Agents, history: &History) -> Vec<Vec<(f64, f64)>> {
    agents.agents.iter()
        .map(|agent| {
            history.rounds().iter()
                .filter_map(|record| record.bid_of(agent.agent_id).map(|bid| (record.round as f64, bid)))
                .collect()
        })
        .collect()
}

/// Series of (round, cumulative spend) per agent
fn spend_per_round(agents: &Agents, history: &History) -> Vec<Vec<(f64, f64)>> {
    let mut series: Vec<Vec<(f64, f64)>> = vec![Vec::with_capacity(history.num_rounds()); agents.len()];
    let mut totals = vec![0.0; agents.len()];
    for record in history.rounds() {
        for (&agent_id, &payment) in record.occupants.iter().zip(record.slot_payments.iter()) {
            totals[agent_id] += payment;
        }
        for (agent_id, total) in totals.iter().enumerate() {
            series[agent_id].push((record.round as f64, *total));
        }
    }
    series
}

/// One line per agent on a shared round axis
fn create_line_chart(
    agents: &Agents,
    series: &[Vec<(f64, f64)>],
    title: &str,
    filename: &str,
    y_label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let x_max = series.iter().flatten().map(|&(x, _)| x).fold(0.0, f64::max).max(1.0);
    let y_max = series.iter().flatten().map(|&(_, y)| y).fold(0.0, f64::max).max(1.0);
    if series.iter().all(|s| s.is_empty()) {
        return Err(format!("Cannot create chart '{}': no data", title).into());
    }

    let root = BitMapBackend::new(filename, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 25))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max * 1.1)?;

    chart.configure_mesh()
        .x_desc("Round")
        .y_desc(y_label)
        .draw()?;

    for (agent, points) in agents.agents.iter().zip(series.iter()) {
        let color = Palette99::pick(agent.agent_id).to_rgba();
        chart.draw_series(LineSeries::new(points.iter().copied(), color))?
            .label(format!("{} ({:.0})", agent.agent_name, agent.value))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentType;
    use crate::game::Game;

    #[test]
    fn test_spend_series_is_cumulative() {
        let mut agents = Agents::new();
        agents.add("A".to_string(), AgentType::TRUTHFUL, 10.0, 1e9);
        agents.add("B".to_string(), AgentType::TRUTHFUL, 8.0, 1e9);
        let game = Game::new(agents, GameConfig { num_rounds: 3, reserve: 0.0, budget: 1e9 });
        let mut logger = Logger::new();
        let history = game.run(&mut logger);

        let spend = spend_per_round(&game.agents, &history);
        assert_eq!(spend[0].len(), 3);
        for w in spend[0].windows(2) {
            assert!(w[1].1 >= w[0].1);
        }
        assert_eq!(spend[0][2].1, history.spent_by(0));

        let bids = bids_per_round(&game.agents, &history);
        assert_eq!(bids[1], vec![(0.0, 8.0), (1.0, 8.0), (2.0, 8.0)]);
    }
}
