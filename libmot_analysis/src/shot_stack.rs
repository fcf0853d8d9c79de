use std::cmp::Ordering;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::constants::SHOT_FILE_EXTENSION;
use super::error::ShotStackError;
use super::folder_label::FolderLabel;
use super::shot_file::ShotFile;

/// The shot files of one folder, in natural order.
///
/// Shot files are numbered by the control software, so a plain lexicographic
/// sort interleaves shot_10 between shot_1 and shot_2. The stack compares
/// digit runs numerically instead. Files are opened one at a time as the stack
/// is drained; each handle closes before the next opens.
#[derive(Debug)]
pub struct ShotStack {
    file_stack: VecDeque<PathBuf>,
    total_stack_size_bytes: u64,
    parent_path: PathBuf,
}

impl ShotStack {
    /// Create a new ShotStack for a folder of shot files
    pub fn new(path: &Path) -> Result<Self, ShotStackError> {
        let (stack, bytes) = Self::get_file_stack(path)?;
        if stack.is_empty() {
            return Err(ShotStackError::NoMatchingFiles(path.to_path_buf()));
        }
        Ok(Self {
            file_stack: stack,
            total_stack_size_bytes: bytes,
            parent_path: path.to_path_buf(),
        })
    }

    /// Open the next shot in the stack.
    ///
    /// Returns a `Result<Option<ShotFile>>`. The Option is None if the stack
    /// has no more shots.
    pub fn next_shot(&mut self) -> Result<Option<ShotFile>, ShotStackError> {
        match self.file_stack.pop_front() {
            Some(file_path) => Ok(Some(ShotFile::open(&file_path)?)),
            None => Ok(None),
        }
    }

    /// Number of shots left in the stack
    pub fn len(&self) -> usize {
        self.file_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_stack.is_empty()
    }

    pub fn get_total_data_size(&self) -> u64 {
        self.total_stack_size_bytes
    }

    pub fn parent_path(&self) -> &Path {
        &self.parent_path
    }

    /// Collect all shot files in the folder, naturally sorted
    fn get_file_stack(parent_path: &Path) -> Result<(VecDeque<PathBuf>, u64), ShotStackError> {
        let mut file_list: Vec<PathBuf> = Vec::new();
        for item in parent_path.read_dir()? {
            let item_path = item?.path();
            let is_shot = item_path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case(SHOT_FILE_EXTENSION))
                .unwrap_or(false);
            if item_path.is_file() && is_shot {
                file_list.push(item_path);
            }
        }

        let total_stack_size_bytes = file_list
            .iter()
            .fold(0, |sum, path| sum + path.metadata().map(|m| m.len()).unwrap_or(0));

        file_list.sort_by(|a, b| natural_cmp_paths(a, b));
        Ok((file_list.into(), total_stack_size_bytes))
    }
}

/// One labeled subfolder of a data day
#[derive(Debug)]
pub struct LabeledFolder {
    pub path: PathBuf,
    pub label: FolderLabel,
}

/// The subfolders of a data-day directory, partitioned by label.
///
/// Used by the layouts where every shot was taken by hand into its own
/// subfolder, with background shots in `background` folders next to the data.
#[derive(Debug)]
pub struct FolderScan {
    pub backgrounds: Vec<LabeledFolder>,
    pub shots: Vec<LabeledFolder>,
}

impl FolderScan {
    /// Scan the subfolders of a parent directory and label each one.
    ///
    /// Unknown folders are dropped with a log line; the callers decide what to
    /// do with Mot folders.
    pub fn new(parent_path: &Path) -> Result<Self, ShotStackError> {
        let mut backgrounds: Vec<LabeledFolder> = Vec::new();
        let mut shots: Vec<LabeledFolder> = Vec::new();

        let mut folders: Vec<PathBuf> = Vec::new();
        for item in parent_path.read_dir()? {
            let item_path = item?.path();
            if item_path.is_dir() {
                folders.push(item_path);
            }
        }
        folders.sort_by(|a, b| natural_cmp_paths(a, b));

        for folder in folders {
            let label = FolderLabel::parse_path(&folder);
            match label {
                FolderLabel::Background => backgrounds.push(LabeledFolder {
                    path: folder,
                    label,
                }),
                FolderLabel::Unknown => {
                    log::info!("Skipping unlabeled folder {:?}", folder);
                }
                _ => shots.push(LabeledFolder {
                    path: folder,
                    label,
                }),
            }
        }

        if backgrounds.is_empty() && shots.is_empty() {
            return Err(ShotStackError::NoMatchingFiles(parent_path.to_path_buf()));
        }

        Ok(Self { backgrounds, shots })
    }
}

/// Compare two names digit-run by digit-run, numbers before text
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();
    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ac), Some(bc)) => {
                if ac.is_ascii_digit() && bc.is_ascii_digit() {
                    let mut a_num: u64 = 0;
                    while let Some(c) = a_chars.peek().copied() {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        a_num = a_num * 10 + c.to_digit(10).unwrap() as u64;
                        a_chars.next();
                    }
                    let mut b_num: u64 = 0;
                    while let Some(c) = b_chars.peek().copied() {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        b_num = b_num * 10 + c.to_digit(10).unwrap() as u64;
                        b_chars.next();
                    }
                    match a_num.cmp(&b_num) {
                        Ordering::Equal => (),
                        ord => return ord,
                    }
                } else {
                    match ac.cmp(&bc) {
                        Ordering::Equal => {
                            a_chars.next();
                            b_chars.next();
                        }
                        ord => return ord,
                    }
                }
            }
        }
    }
}

fn natural_cmp_paths(a: &Path, b: &Path) -> Ordering {
    let a_name = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let b_name = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    natural_cmp(&a_name, &b_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_ordering() {
        assert_eq!(natural_cmp("shot_2.h5", "shot_10.h5"), Ordering::Less);
        assert_eq!(natural_cmp("shot_10.h5", "shot_10.h5"), Ordering::Equal);
        assert_eq!(natural_cmp("shot_10.h5", "shot_9.h5"), Ordering::Greater);
        assert_eq!(natural_cmp("a2b10", "a2b9"), Ordering::Greater);
        assert_eq!(natural_cmp("alpha", "beta"), Ordering::Less);
    }

    #[test]
    fn test_natural_sort_of_shot_names() {
        let mut names = vec!["run_11.h5", "run_2.h5", "run_1.h5", "run_10.h5"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["run_1.h5", "run_2.h5", "run_10.h5", "run_11.h5"]);
    }

    #[test]
    fn test_stack_scan_orders_naturally() {
        let dir = std::env::temp_dir().join(format!("mot_analysis_stack_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["shot_10.h5", "shot_2.h5", "shot_1.h5"] {
            hdf5::File::create(dir.join(name)).unwrap();
        }
        std::fs::write(dir.join("notes.txt"), b"not a shot").unwrap();

        let mut stack = ShotStack::new(&dir).unwrap();
        assert_eq!(stack.len(), 3);
        let mut names = Vec::new();
        while let Some(shot) = stack.next_shot().unwrap() {
            names.push(shot.file_name());
        }
        assert_eq!(names, vec!["shot_1.h5", "shot_2.h5", "shot_10.h5"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_stack_rejects_empty_folder() {
        let dir = std::env::temp_dir().join(format!("mot_analysis_empty_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(matches!(
            ShotStack::new(&dir),
            Err(ShotStackError::NoMatchingFiles(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_folder_scan_partitions_labels() {
        let dir = std::env::temp_dir().join(format!("mot_analysis_scan_{}", std::process::id()));
        for sub in ["background", "2s_after_ramp_green_mot", "zeeman_slower", "notes"] {
            std::fs::create_dir_all(dir.join(sub)).unwrap();
        }

        let scan = FolderScan::new(&dir).unwrap();
        assert_eq!(scan.backgrounds.len(), 1);
        assert_eq!(scan.shots.len(), 2);
        assert!(scan
            .shots
            .iter()
            .any(|folder| folder.label == FolderLabel::Mot));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
