use crate::algos::TutorialOutcome;
use crate::checks::{Report, Severity};
use crate::model::Roster;
use crate::stats::TeamStats;

pub fn display_teams(roster: &Roster, outcomes: &[TutorialOutcome]) {
    for outcome in outcomes {
        println!(
            "Tutorial {} ({} students, {} teams):",
            outcome.tutorial,
            outcome.students,
            outcome.teams.len()
        );
        if let Some(caps) = outcome.caps {
            println!(
                "  caps: {}M/{}F, {} STEM/{} non-STEM",
                caps.male_max, caps.female_max, caps.stem_max, caps.non_stem_max
            );
        }
        for &team in &outcome.teams {
            let members = roster
                .members_of(team)
                .iter()
                .map(|&s| roster.student(s))
                .collect::<Vec<_>>();
            let stats = TeamStats::of(members.iter().copied());
            print!(
                "  - Team {team}: {} members, M={} F={}, STEM={} non-STEM={}, CGPA {:.2} (std {:.2})",
                stats.size,
                stats.male,
                stats.female,
                stats.stem,
                stats.non_stem,
                stats.cgpa_mean,
                stats.cgpa_std
            );
            if let Some((school, n)) = stats.largest_school() {
                print!(", largest school {school} ({n})");
            }
            println!();
            for s in members {
                println!("      {s}");
            }
        }
        if outcome.fallbacks > 0 {
            println!(
                "  {} placement(s) had to ignore the balancing constraints",
                outcome.fallbacks
            );
        }
        println!();
    }
}

pub fn display_summary(roster: &Roster, outcomes: &[TutorialOutcome]) {
    let teams = outcomes.iter().map(|o| o.teams.len()).sum::<usize>();
    let fallbacks = outcomes.iter().map(|o| o.fallbacks).sum::<usize>();
    println!(
        "Students/tutorials/teams: {}/{}/{}",
        roster.students.len(),
        outcomes.len(),
        teams
    );
    if fallbacks > 0 {
        println!("Constraint fallbacks: {fallbacks}");
    }
}

pub fn display_report(report: &Report, details: bool) {
    println!(
        "Validated {} students in {} teams (team size {}, strictness {:?})",
        report.students,
        report.teams.len(),
        report.team_size,
        report.strictness
    );
    for (tutorial, caps) in &report.tutorials {
        println!(
            "  - Tutorial {tutorial}: max {}M/{}F per team",
            caps.male_max, caps.female_max
        );
    }
    println!();
    if details {
        for team in &report.teams {
            print!(
                "Tutorial {}, Team {}: {} members, M={} F={}",
                team.tutorial,
                team.team,
                team.members.len(),
                team.male,
                team.female
            );
            if let (Some(mean), Some(std)) = (team.cgpa_mean, team.cgpa_std) {
                print!(", CGPA {mean:.2} (std {std:.2})");
            }
            if let Some((school, n)) = &team.largest_school {
                print!(", largest school {school} ({n})");
            }
            println!();
            println!("    {}", team.members.join(", "));
        }
        println!();
    }
    for severity in [Severity::Critical, Severity::Warning, Severity::Info] {
        let issues = report
            .issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect::<Vec<_>>();
        if !issues.is_empty() {
            println!("{severity} ({}):", issues.len());
            for issue in issues {
                println!("  - {issue}");
            }
            println!();
        }
    }
    let score = &report.score;
    println!(
        "Gender balance: {:.1}%, school diversity: {:.1}%, CGPA distribution: {:.1}%",
        score.gender_rate, score.school_rate, score.cgpa_score
    );
    if score.penalty > 0.0 {
        println!("Critical issue penalty: -{:.0}", score.penalty);
    }
    println!("Overall score: {:.1}/100, grade {}", score.overall, score.grade);
}
