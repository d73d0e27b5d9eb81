//! Stock photos served when a portrait cannot be generated.

use crate::choices::Job;

const STOCK_BASE: &str = "https://source.unsplash.com/1024x1024/";

/// Search terms for a job's stock photo.
fn stock_query(job: &Job) -> &'static str {
    match job {
        Job::Doctor => "doctor,portrait",
        Job::Teacher => "teacher,classroom",
        Job::Scientist => "scientist,laboratory",
        Job::Astronaut => "astronaut",
        Job::Firefighter => "firefighter",
        Job::PoliceOfficer => "police,officer",
        Job::Chef => "chef,kitchen",
        Job::Athlete => "athlete,stadium",
        Job::Artist => "artist,painting",
        Job::Musician => "musician,stage",
        Job::Pilot => "pilot,cockpit",
        Job::Programmer => "programmer,computer",
        Job::Custom(_) => "professional,portrait",
    }
}

/// Stock photo URL for a job.
pub fn stock_image_url(job: &Job) -> String {
    format!("{STOCK_BASE}?{}", stock_query(job))
}
