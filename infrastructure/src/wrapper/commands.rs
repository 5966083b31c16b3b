//! Command lines for each tool
//!
//! Translates a [`ParameterMap`] into the program's argv and the outputs the
//! program writes, following each program's own file-naming rules. Every path
//! argument is made absolute first: containers bind-mount host directories at
//! the same path and start in the image's own working directory.

use neuro_application::WrapperError;
use neuro_domain::tool::invocation::image_stem;
use neuro_domain::{NeuroTool, ParameterMap, WrapperOutputs};
use std::path::{Path, PathBuf};

/// FAST's largest useful class count; each class is one predicted output
pub const MAX_TISSUE_CLASSES: i64 = 10;

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    pub program: &'static str,
    pub args: Vec<String>,
    /// Outputs the program writes on success
    pub outputs: WrapperOutputs,
    /// Host directories the program reads or writes
    pub mounts: Vec<PathBuf>,
}

impl ToolCommand {
    fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
            outputs: WrapperOutputs::new(),
            mounts: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Mount the directory containing `path`
    fn mount_parent(mut self, path: &str) -> Self {
        let dir = Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        self.push_mount(dir);
        self
    }

    fn mount_dir(mut self, dir: &str) -> Self {
        self.push_mount(Path::new(dir));
        self
    }

    fn push_mount(&mut self, dir: &Path) {
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !self.mounts.contains(&dir) {
            self.mounts.push(dir);
        }
    }
}

fn require_str<'a>(params: &'a ParameterMap, name: &str) -> Result<&'a str, WrapperError> {
    params
        .get_str(name)
        .ok_or_else(|| WrapperError::InvalidParameter {
            name: name.to_string(),
            reason: "missing or not a string".to_string(),
        })
}

/// `name` as an absolute path string
fn host_path(params: &ParameterMap, name: &str) -> Result<String, WrapperError> {
    let raw = require_str(params, name)?;
    if Path::new(raw).is_absolute() {
        return Ok(raw.to_string());
    }
    let invalid = |reason: String| WrapperError::InvalidParameter {
        name: name.to_string(),
        reason,
    };
    std::path::absolute(raw)
        .map_err(|e| invalid(format!("cannot resolve '{}': {}", raw, e)))?
        .into_os_string()
        .into_string()
        .map_err(|_| invalid(format!("'{}' resolves to a non-UTF-8 path", raw)))
}

fn require_i64(params: &ParameterMap, name: &str) -> Result<i64, WrapperError> {
    params
        .get_i64(name)
        .ok_or_else(|| WrapperError::InvalidParameter {
            name: name.to_string(),
            reason: "missing or not an integer".to_string(),
        })
}

fn require_f64(params: &ParameterMap, name: &str) -> Result<f64, WrapperError> {
    params
        .get_f64(name)
        .ok_or_else(|| WrapperError::InvalidParameter {
            name: name.to_string(),
            reason: "missing or not a number".to_string(),
        })
}

/// Build the command line for `tool`.
pub fn build_command(tool: NeuroTool, params: &ParameterMap) -> Result<ToolCommand, WrapperError> {
    match tool {
        NeuroTool::Bet => bet(params),
        NeuroTool::Fast => fast(params),
        NeuroTool::Flirt => flirt(params),
        NeuroTool::Dwi2Fod => dwi2fod(params),
        NeuroTool::ReconAll => recon_all(params),
    }
}

/// `bet <in> <out> -f <f> [-m]`
fn bet(params: &ParameterMap) -> Result<ToolCommand, WrapperError> {
    let infile = host_path(params, "infile")?;
    let maskfile = host_path(params, "maskfile")?;
    let fractional_intensity = require_f64(params, "fractional_intensity")?;
    if !(0.0..=1.0).contains(&fractional_intensity) {
        return Err(WrapperError::InvalidParameter {
            name: "fractional_intensity".to_string(),
            reason: format!("{} is outside [0, 1]", fractional_intensity),
        });
    }

    let mut cmd = ToolCommand::new("bet")
        .arg(&infile)
        .arg(&maskfile)
        .arg("-f")
        .arg(fractional_intensity.to_string())
        .mount_parent(&infile)
        .mount_parent(&maskfile);

    let stem = image_stem(&maskfile);
    cmd.outputs = WrapperOutputs::new().with_path("outfile", format!("{}.nii.gz", stem));
    if params.flag("binary_mask") {
        cmd = cmd.arg("-m");
        cmd.outputs = cmd
            .outputs
            .with_path("binary_mask", format!("{}_mask.nii.gz", stem));
    }
    Ok(cmd)
}

/// `fast -n <classes> -o <base> [-b] [-p] <in>`
fn fast(params: &ParameterMap) -> Result<ToolCommand, WrapperError> {
    let infile = host_path(params, "infile")?;
    let basename = host_path(params, "basename")?;
    let classes = require_i64(params, "classes")?;
    if !(1..=MAX_TISSUE_CLASSES).contains(&classes) {
        return Err(WrapperError::InvalidParameter {
            name: "classes".to_string(),
            reason: format!(
                "{} tissue classes requested, expected 1 to {}",
                classes, MAX_TISSUE_CLASSES
            ),
        });
    }

    let mut cmd = ToolCommand::new("fast")
        .arg("-n")
        .arg(classes.to_string())
        .arg("-o")
        .arg(&basename);
    if params.flag("bias_field") {
        cmd = cmd.arg("-b");
    }
    if params.flag("probability_maps") {
        cmd = cmd.arg("-p");
    }
    cmd = cmd.arg(&infile).mount_parent(&infile).mount_parent(&basename);

    let mut outputs = WrapperOutputs::new()
        .with_path("outfile", format!("{}_seg.nii.gz", basename))
        .with_paths(
            "tissue_maps",
            (0..classes).map(|i| format!("{}_pve_{}.nii.gz", basename, i)),
        );
    if params.flag("bias_field") {
        outputs = outputs.with_path("bias_field", format!("{}_bias.nii.gz", basename));
    }
    cmd.outputs = outputs;
    Ok(cmd)
}

/// `flirt -in <in> -ref <ref> -out <out> -omat <mat> -dof <n> -cost <cost>`
fn flirt(params: &ParameterMap) -> Result<ToolCommand, WrapperError> {
    let infile = host_path(params, "infile")?;
    let reference = host_path(params, "reference")?;
    let outfile = host_path(params, "outfile")?;
    let dof = require_i64(params, "dof")?;
    let cost = require_str(params, "cost")?;

    let mut cmd = ToolCommand::new("flirt")
        .arg("-in")
        .arg(&infile)
        .arg("-ref")
        .arg(&reference)
        .arg("-out")
        .arg(&outfile);

    let mut outputs = WrapperOutputs::new().with_path("outfile", &outfile);
    if params.get_str("omat").is_some() {
        let omat = host_path(params, "omat")?;
        cmd = cmd.arg("-omat").arg(&omat).mount_parent(&omat);
        outputs = outputs.with_path("omat", omat);
    }

    cmd = cmd
        .arg("-dof")
        .arg(dof.to_string())
        .arg("-cost")
        .arg(cost)
        .mount_parent(&infile)
        .mount_parent(&reference)
        .mount_parent(&outfile);
    cmd.outputs = outputs;
    Ok(cmd)
}

/// `dwi2fod <algorithm> <dwi> <response> <fod>`
fn dwi2fod(params: &ParameterMap) -> Result<ToolCommand, WrapperError> {
    let algorithm = require_str(params, "algorithm")?;
    let dwi = host_path(params, "dwi")?;
    let response = host_path(params, "response")?;
    let fod = host_path(params, "fod")?;

    let mut cmd = ToolCommand::new("dwi2fod")
        .arg(algorithm)
        .arg(&dwi)
        .arg(&response)
        .arg(&fod)
        .mount_parent(&dwi)
        .mount_parent(&response)
        .mount_parent(&fod);
    cmd.outputs = WrapperOutputs::new().with_path("fod", fod);
    Ok(cmd)
}

/// `recon-all -i <in> -s <subject> -sd <subjects_dir> -all`
fn recon_all(params: &ParameterMap) -> Result<ToolCommand, WrapperError> {
    let input_file = host_path(params, "input_file")?;
    let subject_id = require_str(params, "subject_id")?;
    let subjects_dir = host_path(params, "subjects_dir")?;

    let mut cmd = ToolCommand::new("recon-all")
        .arg("-i")
        .arg(&input_file)
        .arg("-s")
        .arg(subject_id)
        .arg("-sd")
        .arg(&subjects_dir);
    if params.flag("all") {
        cmd = cmd.arg("-all");
    }
    cmd = cmd.mount_parent(&input_file).mount_dir(&subjects_dir);
    cmd.outputs = WrapperOutputs::new()
        .with_path("subject_dir", Path::new(&subjects_dir).join(subject_id));
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_domain::{
        BetRequest, Dwi2FodRequest, FastRequest, FlirtRequest, InvocationContext,
        ReconAllRequest, ToolInvocation,
    };

    fn ctx() -> InvocationContext {
        InvocationContext::new("/data/outputs", "/data/subjects")
    }

    fn command_for(invocation: &dyn ToolInvocation) -> ToolCommand {
        build_command(invocation.tool(), &invocation.parameters(&ctx())).unwrap()
    }

    #[test]
    fn test_bet_command() {
        let cmd = command_for(&BetRequest::new("/in/t1.nii.gz"));

        assert_eq!(
            cmd.args,
            vec![
                "/in/t1.nii.gz",
                "/data/outputs/brain_extracted.nii.gz",
                "-f",
                "0.5",
                "-m"
            ]
        );
        assert_eq!(
            cmd.outputs.path("binary_mask"),
            Some(Path::new("/data/outputs/brain_extracted_mask.nii.gz"))
        );
        assert_eq!(
            cmd.mounts,
            vec![PathBuf::from("/in"), PathBuf::from("/data/outputs")]
        );
    }

    #[test]
    fn test_bet_rejects_out_of_range_threshold() {
        let mut req = BetRequest::new("/in/t1.nii.gz");
        req.fractional_intensity = 1.5;
        let err = build_command(NeuroTool::Bet, &req.parameters(&ctx())).unwrap_err();
        assert!(matches!(err, WrapperError::InvalidParameter { ref name, .. } if name == "fractional_intensity"));
    }

    #[test]
    fn test_fast_command_and_outputs() {
        let cmd = command_for(&FastRequest::new("/in/brain.nii.gz"));

        assert_eq!(
            cmd.args,
            vec!["-n", "3", "-o", "/data/outputs/segmented", "-b", "-p", "/in/brain.nii.gz"]
        );
        assert_eq!(cmd.outputs.paths("tissue_maps").len(), 3);
        assert_eq!(
            cmd.outputs.path("bias_field"),
            Some(Path::new("/data/outputs/segmented_bias.nii.gz"))
        );
    }

    #[test]
    fn test_flirt_command() {
        let cmd = command_for(&FlirtRequest::new("/in/brain.nii.gz", "/ref/mni.nii.gz"));

        assert_eq!(
            cmd.args,
            vec![
                "-in",
                "/in/brain.nii.gz",
                "-ref",
                "/ref/mni.nii.gz",
                "-out",
                "/data/outputs/registered.nii.gz",
                "-omat",
                "/data/outputs/registered.mat",
                "-dof",
                "12",
                "-cost",
                "corratio"
            ]
        );
        assert_eq!(cmd.mounts.len(), 3);
    }

    #[test]
    fn test_dwi2fod_command() {
        let cmd = command_for(&Dwi2FodRequest::new("/in/dwi.mif", "/in/wm.txt"));

        assert_eq!(cmd.program, "dwi2fod");
        assert_eq!(
            cmd.args,
            vec!["csd", "/in/dwi.mif", "/in/wm.txt", "/data/outputs/wmfod.mif"]
        );
        assert_eq!(
            cmd.outputs.path("fod"),
            Some(Path::new("/data/outputs/wmfod.mif"))
        );
    }

    #[test]
    fn test_recon_all_command() {
        let cmd = command_for(&ReconAllRequest::new("/in/t1.nii.gz", "sub-01"));

        assert_eq!(
            cmd.args,
            vec!["-i", "/in/t1.nii.gz", "-s", "sub-01", "-sd", "/data/subjects", "-all"]
        );
        assert!(cmd.mounts.contains(&PathBuf::from("/data/subjects")));
    }

    #[test]
    fn test_relative_paths_become_absolute() {
        let relative = InvocationContext::new("data/outputs", "data/subjects");
        let req = FlirtRequest::new("in/brain.nii.gz", "ref/mni.nii.gz");
        let cmd = build_command(NeuroTool::Flirt, &req.parameters(&relative)).unwrap();
        let cwd = std::env::current_dir().unwrap();

        for flag in ["-in", "-ref", "-out", "-omat"] {
            let pos = cmd.args.iter().position(|a| a == flag).unwrap();
            let path = Path::new(&cmd.args[pos + 1]);
            assert!(path.is_absolute(), "{flag} {}", path.display());
            assert!(path.starts_with(&cwd));
            assert!(cmd.mounts.iter().any(|m| path.starts_with(m)));
        }
        assert_eq!(
            cmd.outputs.path("outfile"),
            Some(cwd.join("data/outputs/registered.nii.gz").as_path())
        );

        let recon = ReconAllRequest::new("t1.nii.gz", "sub-01");
        let cmd = build_command(NeuroTool::ReconAll, &recon.parameters(&relative)).unwrap();
        assert_eq!(cmd.args[5], cwd.join("data/subjects").to_str().unwrap());
        assert!(cmd.mounts.contains(&cwd.join("data/subjects")));
    }

    #[test]
    fn test_fast_rejects_implausible_class_counts() {
        for classes in [0u32, 11, 4_000_000_000] {
            let mut req = FastRequest::new("/in/brain.nii.gz");
            req.tissue_classes = classes;
            let err = build_command(NeuroTool::Fast, &req.parameters(&ctx())).unwrap_err();
            assert!(
                matches!(err, WrapperError::InvalidParameter { ref name, .. } if name == "classes"),
                "{classes}: {err}"
            );
        }

        let mut req = FastRequest::new("/in/brain.nii.gz");
        req.tissue_classes = 10;
        let cmd = build_command(NeuroTool::Fast, &req.parameters(&ctx())).unwrap();
        assert_eq!(cmd.outputs.paths("tissue_maps").len(), 10);
    }

    #[test]
    fn test_missing_parameter() {
        let err = build_command(NeuroTool::Flirt, &ParameterMap::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid parameter 'infile': missing or not a string"
        );
    }
}
