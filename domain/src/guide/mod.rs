//! Analysis guidance served as the `neuroimaging_analysis_guide` prompt

use std::str::FromStr;

use crate::core::error::DomainError;

/// Analyses the guide has text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    BrainExtraction,
    Preprocessing,
    Diffusion,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] = [
        AnalysisType::BrainExtraction,
        AnalysisType::Preprocessing,
        AnalysisType::Diffusion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::BrainExtraction => "brain_extraction",
            AnalysisType::Preprocessing => "preprocessing",
            AnalysisType::Diffusion => "diffusion",
        }
    }

    pub fn guide(&self) -> &'static str {
        match self {
            AnalysisType::BrainExtraction => BRAIN_EXTRACTION_GUIDE,
            AnalysisType::Preprocessing => PREPROCESSING_GUIDE,
            AnalysisType::Diffusion => DIFFUSION_GUIDE,
        }
    }
}

impl FromStr for AnalysisType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::UnknownAnalysisType(s.to_string()))
    }
}

const BRAIN_EXTRACTION_GUIDE: &str = "\
Brain extraction is the first step in most neuroimaging analyses. Here's a typical workflow:

1. Start with a T1-weighted anatomical image
2. Use FSL BET with appropriate fractional intensity (0.3-0.7)
3. Visual quality control of extraction results
4. Proceed with further analysis on brain-extracted image

Parameters to consider:
- Lower fractional intensity (0.3) for more conservative extraction
- Higher fractional intensity (0.7) for more aggressive extraction
- Default (0.5) works well for most cases
";

const PREPROCESSING_GUIDE: &str = "\
Standard T1 preprocessing pipeline:

1. Brain extraction (BET)
2. Tissue segmentation (FAST)
3. Spatial normalization (FLIRT to MNI space)
4. Quality control at each step

This pipeline prepares data for group-level statistical analysis.
";

const DIFFUSION_GUIDE: &str = "\
Diffusion MRI analysis workflow:

1. Preprocessing: denoising, motion correction, eddy current correction
2. Response function estimation
3. Fiber orientation distribution estimation (dwi2fod)
4. Tractography generation
5. Connectome construction

Requires DWI data with b-values and gradient directions.
";

/// Guide text for `analysis_type`.
///
/// Unknown types get a fixed message listing the available ones rather
/// than an error.
pub fn analysis_guide(analysis_type: &str) -> String {
    match analysis_type.parse::<AnalysisType>() {
        Ok(t) => t.guide().to_string(),
        Err(_) => {
            let available: Vec<&str> = AnalysisType::ALL.iter().map(|t| t.as_str()).collect();
            format!(
                "Unknown analysis type. Available types: {}",
                available.join(", ")
            )
        }
    }
}
