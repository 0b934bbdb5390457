use mediafuse::FusionError;
use mediafuse::models::ContainerId;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

/// Parse a `category=weight` pair
pub fn parse_weight(pair: &str) -> mediafuse::Result<(String, f64)> {
    let Some((category, weight)) = pair.split_once('=') else {
        return Err(FusionError::Other(format!(
            "Invalid weight '{}': expected CATEGORY=WEIGHT, e.g. color=2.0",
            pair
        )));
    };

    let category = category.trim();
    if category.is_empty() {
        return Err(FusionError::InvalidIdentifier(format!(
            "category in weight '{}'",
            pair
        )));
    }
    let weight: f64 = weight.trim().parse().map_err(|_| {
        FusionError::Other(format!("Invalid weight '{}': '{}' is not a number", pair, weight))
    })?;

    Ok((category.to_string(), weight))
}

/// Validate query container ids given on the command line
pub fn check_containers(containers: &[ContainerId]) -> mediafuse::Result<Vec<ContainerId>> {
    if containers.is_empty() {
        return Err(FusionError::EmptyQueryContainers);
    }
    Ok(containers.to_vec())
}

/// Open a score stream, with "-" meaning stdin
pub fn open_input(input: &str) -> mediafuse::Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(input).map_err(|e| {
        FusionError::Io(io::Error::new(
            e.kind(),
            format!("Failed to open score stream '{}': {}", input, e),
        ))
    })?;
    Ok(Box::new(BufReader::new(file)))
}
