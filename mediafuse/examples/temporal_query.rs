use mediafuse::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // A three-part query: "a red car", then "a crossing", then "a bridge"
    let config = ConfigBuilder::development()
        .with_temporal_distance_cap(20.0)
        .build()?;
    let (mut session, _guard) = mediafuse::init(&config, vec![1, 2, 3])?;
    session.set_weight("color", 2.0)?;

    let stream = [
        ScoreUpdate::new("drive", "drive_1", 1, "color", 0.9, 0.0, 4.0),
        ScoreUpdate::new("drive", "drive_1", 1, "edge", 0.5, 0.0, 4.0),
        ScoreUpdate::new("drive", "drive_2", 2, "edge", 0.8, 10.0, 14.0),
        ScoreUpdate::new("drive", "drive_3", 3, "edge", 0.7, 25.0, 30.0),
        // Right shots, wrong order
        ScoreUpdate::new("parade", "parade_1", 3, "edge", 0.95, 0.0, 3.0),
        ScoreUpdate::new("parade", "parade_2", 1, "color", 0.95, 5.0, 8.0),
        // Too far apart to form one scene
        ScoreUpdate::new("trip", "trip_1", 1, "color", 1.0, 0.0, 2.0),
        ScoreUpdate::new("trip", "trip_2", 2, "edge", 1.0, 60.0, 62.0),
    ];
    for update in stream {
        session.apply_score(update)?;
    }

    println!("Objects:");
    for ranked in session.rank_objects(|_| true) {
        println!("  {}. {} {:.3}", ranked.rank, ranked.object_id, ranked.score);
        if let Some(path) = session.optimal_path(&ranked.object_id) {
            for step in &path.steps {
                println!(
                    "       [{}] {} @ {:.1}s ({:.3})",
                    step.container_id, step.segment_id, step.startabs, step.score
                );
            }
        }
    }

    println!("\nSegments:");
    for ranked in session.rank_segments(|_| true).iter().take(5) {
        println!(
            "  {}. {} ({}) {:.3}",
            ranked.rank, ranked.segment_id, ranked.object_id, ranked.score
        );
    }

    // A new query drops the results but keeps the weights
    session.begin(vec![1, 2])?;
    println!(
        "\nAfter begin: {} objects, {} categories",
        session.results().len(),
        session.categories().len()
    );

    Ok(())
}
