//! Typed user choices.
//!
//! Forms send either the Korean label shown in the wizard or an English key.
//! Each choice parses both and stores a stable English key.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Maximum length of a free-text job.
pub const MAX_CUSTOM_JOB_CHARS: usize = 40;

/// A choice value that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {value:?}")]
pub struct ChoiceError {
    pub field: &'static str,
    pub value: String,
}

impl ChoiceError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Lowercase and drop spaces, `-` and `_` so `Upper body`, `upper_body` and
/// `상반신` style inputs compare cleanly.
fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// The future job shown in the portrait.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Job {
    Doctor,
    Teacher,
    Scientist,
    Astronaut,
    Firefighter,
    PoliceOfficer,
    Chef,
    Athlete,
    Artist,
    Musician,
    Pilot,
    Programmer,
    /// Free text typed by the user.
    Custom(String),
}

impl Job {
    pub const KNOWN: [Job; 12] = [
        Job::Doctor,
        Job::Teacher,
        Job::Scientist,
        Job::Astronaut,
        Job::Firefighter,
        Job::PoliceOfficer,
        Job::Chef,
        Job::Athlete,
        Job::Artist,
        Job::Musician,
        Job::Pilot,
        Job::Programmer,
    ];

    /// Stable key stored with the image.
    pub fn as_str(&self) -> &str {
        match self {
            Job::Doctor => "doctor",
            Job::Teacher => "teacher",
            Job::Scientist => "scientist",
            Job::Astronaut => "astronaut",
            Job::Firefighter => "firefighter",
            Job::PoliceOfficer => "police_officer",
            Job::Chef => "chef",
            Job::Athlete => "athlete",
            Job::Artist => "artist",
            Job::Musician => "musician",
            Job::Pilot => "pilot",
            Job::Programmer => "programmer",
            Job::Custom(text) => text,
        }
    }

    /// How the job reads inside a prompt.
    pub fn description(&self) -> String {
        let text = match self {
            Job::Doctor => "a doctor wearing a white coat with a stethoscope, in a bright hospital",
            Job::Teacher => "a teacher standing in front of a classroom blackboard",
            Job::Scientist => "a scientist in a lab coat surrounded by laboratory equipment",
            Job::Astronaut => "an astronaut in a detailed space suit, with stars and a spacecraft behind",
            Job::Firefighter => "a firefighter in protective turnout gear and helmet, next to a fire truck",
            Job::PoliceOfficer => "a police officer in a neat uniform",
            Job::Chef => "a chef in a white chef's jacket and toque, in a professional kitchen",
            Job::Athlete => "a professional athlete in sportswear, in a stadium",
            Job::Artist => "an artist holding a paintbrush in front of a canvas in a studio",
            Job::Musician => "a musician performing with an instrument on stage",
            Job::Pilot => "an airline pilot in uniform and cap, in a cockpit",
            Job::Programmer => "a software engineer working at a desk with multiple monitors",
            Job::Custom(text) => return format!("a {text}, dressed and equipped for the job"),
        };
        text.to_string()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Job {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let job = match normalize(s).as_str() {
            "doctor" | "의사" => Job::Doctor,
            "teacher" | "선생님" | "교사" => Job::Teacher,
            "scientist" | "과학자" => Job::Scientist,
            "astronaut" | "우주비행사" => Job::Astronaut,
            "firefighter" | "소방관" => Job::Firefighter,
            "policeofficer" | "police" | "경찰" | "경찰관" => Job::PoliceOfficer,
            "chef" | "cook" | "요리사" | "셰프" => Job::Chef,
            "athlete" | "운동선수" => Job::Athlete,
            "artist" | "painter" | "화가" | "예술가" => Job::Artist,
            "musician" | "음악가" => Job::Musician,
            "pilot" | "조종사" | "파일럿" => Job::Pilot,
            "programmer" | "developer" | "프로그래머" | "개발자" => Job::Programmer,
            _ => {
                let text = s.trim();
                let len = text.chars().count();
                if len == 0 || len > MAX_CUSTOM_JOB_CHARS || text.chars().any(char::is_control) {
                    return Err(ChoiceError::new("job", s));
                }
                Job::Custom(text.to_string())
            }
        };
        Ok(job)
    }
}

/// Age of the future self, 1 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Age(u8);

impl Age {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    pub fn new(years: u8) -> Result<Self, ChoiceError> {
        if (Self::MIN..=Self::MAX).contains(&years) {
            Ok(Self(years))
        } else {
            Err(ChoiceError::new("age", &years.to_string()))
        }
    }

    pub fn years(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Age {
    type Err = ChoiceError;

    /// Accepts `25`, `25세`, `25살` and decades like `20대` (read as 25).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, decade) = if let Some(d) = trimmed.strip_suffix('대') {
            (d.trim(), true)
        } else if let Some(d) = trimmed
            .strip_suffix('세')
            .or_else(|| trimmed.strip_suffix('살'))
        {
            (d.trim(), false)
        } else {
            (trimmed, false)
        };

        let value: u8 = digits.parse().map_err(|_| ChoiceError::new("age", s))?;
        let years = if decade {
            if value % 10 != 0 {
                return Err(ChoiceError::new("age", s));
            }
            value.saturating_add(5)
        } else {
            value
        };

        Age::new(years).map_err(|_| ChoiceError::new("age", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Noun used in prompts for an adult or a child of this gender.
    pub fn noun(&self, age: Age) -> &'static str {
        match (self, age.years() < 18) {
            (Gender::Male, false) => "man",
            (Gender::Male, true) => "boy",
            (Gender::Female, false) => "woman",
            (Gender::Female, true) => "girl",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "male" | "m" | "man" | "boy" | "남성" | "남자" | "남" => Ok(Gender::Male),
            "female" | "f" | "woman" | "girl" | "여성" | "여자" | "여" => Ok(Gender::Female),
            _ => Err(ChoiceError::new("gender", s)),
        }
    }
}

/// Rendering style of a portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtStyle {
    Realistic,
    Illustration,
    Anime,
    ThreeD,
    Watercolor,
    OilPainting,
}

impl ArtStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtStyle::Realistic => "realistic",
            ArtStyle::Illustration => "illustration",
            ArtStyle::Anime => "anime",
            ArtStyle::ThreeD => "3d",
            ArtStyle::Watercolor => "watercolor",
            ArtStyle::OilPainting => "oil_painting",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ArtStyle::Realistic => "photorealistic, high-resolution photograph with natural skin texture",
            ArtStyle::Illustration => "clean digital illustration with soft shading",
            ArtStyle::Anime => "Japanese anime style with expressive eyes and cel shading",
            ArtStyle::ThreeD => "3D animated movie character style with soft global illumination",
            ArtStyle::Watercolor => "delicate watercolor painting with gentle color bleeds on textured paper",
            ArtStyle::OilPainting => "classical oil painting with visible brush strokes and rich colors",
        }
    }
}

impl fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtStyle {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "realistic" | "photo" | "실사" | "사실적" => Ok(ArtStyle::Realistic),
            "illustration" | "일러스트" => Ok(ArtStyle::Illustration),
            "anime" | "애니" | "애니메이션" => Ok(ArtStyle::Anime),
            "3d" | "3d캐릭터" => Ok(ArtStyle::ThreeD),
            "watercolor" | "수채화" => Ok(ArtStyle::Watercolor),
            "oilpainting" | "oil" | "유화" => Ok(ArtStyle::OilPainting),
            _ => Err(ChoiceError::new("style", s)),
        }
    }
}

/// Framing of a portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    CloseUp,
    UpperBody,
    FullBody,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::CloseUp => "closeup",
            Layout::UpperBody => "upper_body",
            Layout::FullBody => "full_body",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Layout::CloseUp => "Close-up shot of the face and shoulders",
            Layout::UpperBody => "Medium shot from the waist up",
            Layout::FullBody => "Full-body shot showing the whole figure from head to toe",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "closeup" | "face" | "얼굴" | "클로즈업" => Ok(Layout::CloseUp),
            "upperbody" | "bust" | "상반신" => Ok(Layout::UpperBody),
            "fullbody" | "전신" => Ok(Layout::FullBody),
            _ => Err(ChoiceError::new("layout", s)),
        }
    }
}

/// Rendering style for a doodle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoodleStyle {
    Realistic,
    ThreeD,
    Anime,
    Watercolor,
    Clay,
    Storybook,
}

impl DoodleStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoodleStyle::Realistic => "realistic",
            DoodleStyle::ThreeD => "3d",
            DoodleStyle::Anime => "anime",
            DoodleStyle::Watercolor => "watercolor",
            DoodleStyle::Clay => "clay",
            DoodleStyle::Storybook => "storybook",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DoodleStyle::Realistic => "a photorealistic scene, as if the drawn subjects existed in real life",
            DoodleStyle::ThreeD => "a bright 3D animated movie render with soft lighting",
            DoodleStyle::Anime => "a colorful anime illustration",
            DoodleStyle::Watercolor => "a soft watercolor painting",
            DoodleStyle::Clay => "a claymation scene made of handcrafted plasticine figures",
            DoodleStyle::Storybook => "a warm children's storybook illustration",
        }
    }
}

impl fmt::Display for DoodleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoodleStyle {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "realistic" | "photo" | "실사" => Ok(DoodleStyle::Realistic),
            "3d" | "3d애니메이션" => Ok(DoodleStyle::ThreeD),
            "anime" | "애니" | "애니메이션" => Ok(DoodleStyle::Anime),
            "watercolor" | "수채화" => Ok(DoodleStyle::Watercolor),
            "clay" | "claymation" | "클레이" | "점토" => Ok(DoodleStyle::Clay),
            "storybook" | "fairytale" | "동화" | "동화책" => Ok(DoodleStyle::Storybook),
            _ => Err(ChoiceError::new("style", s)),
        }
    }
}
