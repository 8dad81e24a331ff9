use serde::Serialize;

/// Numeric constructor declared for an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Integer,
    Float,
}

impl FeatureKind {
    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::Integer => "integer",
            FeatureKind::Float => "float",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FeatureKind::Integer,
    }
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FeatureKind::Float,
    }
}

pub const HEALTH_SCORE: &str = "HealthScore";
pub const CARDIOMETABOLIC_INDEX: &str = "CardiometabolicIndex";
pub const TOTAL_HEALTH_SCORE: &str = "TotalHealthScore";

/// Caller-supplied measurements in the order the classifier was trained on.
pub const INPUT_SCHEMA: [FieldSpec; 32] = [
    int("Age"),
    int("Gender"),
    int("Ethnicity"),
    int("EducationLevel"),
    float("BMI"),
    int("Smoking"),
    float("AlcoholConsumption"),
    float("PhysicalActivity"),
    float("DietQuality"),
    float("SleepQuality"),
    int("FamilyHistoryAlzheimers"),
    int("CardiovascularDisease"),
    int("Diabetes"),
    int("Depression"),
    int("HeadInjury"),
    int("Hypertension"),
    int("SystolicBP"),
    int("DiastolicBP"),
    float("CholesterolTotal"),
    float("CholesterolLDL"),
    float("CholesterolHDL"),
    float("CholesterolTriglycerides"),
    float("MMSE"),
    float("FunctionalAssessment"),
    int("MemoryComplaints"),
    int("BehavioralProblems"),
    float("ADL"),
    int("Confusion"),
    int("Disorientation"),
    int("PersonalityChanges"),
    int("DifficultyCompletingTasks"),
    int("Forgetfulness"),
];

/// Composite columns appended after the inputs, in this order.
pub const DERIVED_COLUMNS: [&str; 3] = [HEALTH_SCORE, CARDIOMETABOLIC_INDEX, TOTAL_HEALTH_SCORE];

/// Numeric columns the fitted scaler was trained against.
pub const DEFAULT_SCALED_COLUMNS: [&str; 18] = [
    "Age",
    "BMI",
    "AlcoholConsumption",
    "PhysicalActivity",
    "DietQuality",
    "SleepQuality",
    "SystolicBP",
    "DiastolicBP",
    "CholesterolTotal",
    "CholesterolLDL",
    "CholesterolHDL",
    "CholesterolTriglycerides",
    "MMSE",
    "FunctionalAssessment",
    "ADL",
    HEALTH_SCORE,
    CARDIOMETABOLIC_INDEX,
    TOTAL_HEALTH_SCORE,
];

/// Full classifier column layout: inputs followed by the derived composites.
pub fn vector_columns() -> Vec<&'static str> {
    INPUT_SCHEMA
        .iter()
        .map(|field| field.name)
        .chain(DERIVED_COLUMNS)
        .collect()
}

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    INPUT_SCHEMA.iter().find(|field| field.name == name)
}
