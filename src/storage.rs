//! Public storage for uploaded Pokemon images.
//!
//! Images are stored in the `images` subdirectory of a public root directory (see
//! [`get_public_path`]), under a name derived from the upload's timestamp. The path stored in the
//! database is relative to the public root (e.g. `images/1732800648.jpg`).

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};

use crate::error::{EnvVarContext, StorageContext};
use crate::helpers::env::optional_env_var;
use crate::models::pokemon::ImageUpload;

/// Public root used when the `PUBLIC_PATH` environment variable is not set.
pub const DEFAULT_PUBLIC_PATH: &str = "public";

/// Name of the directory containing the images, relative to the public root.
pub const IMAGES_DIR: &str = "images";

/// Returns the path of the public root directory.
///
/// Reads the `PUBLIC_PATH` environment variable; defaults to [`DEFAULT_PUBLIC_PATH`].
pub fn get_public_path() -> crate::Result<PathBuf> {
    let public_path = optional_env_var("PUBLIC_PATH")
        .with_env_var_context(|| "PUBLIC_PATH should contain a valid path")?
        .unwrap_or_else(|| DEFAULT_PUBLIC_PATH.into());

    Ok(public_path.into())
}

/// Returns an [`ImageStorage`] rooted at the [public path](get_public_path).
pub fn get_image_storage() -> crate::Result<ImageStorage> {
    ImageStorage::new(get_public_path()?)
}

/// Handle to the public image storage.
///
/// Cheap to clone; each `actix_web` worker gets its own copy.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    public_dir: PathBuf,
}

/// An image that has been moved to public storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Path of the image relative to the public root (`images/<filename>`).
    ///
    /// This is the value stored in the `image` column.
    pub relative_path: String,

    /// Full path of the image on disk.
    pub path: PathBuf,
}

impl ImageStorage {
    /// Creates a storage rooted at `public_dir`, creating its `images` directory if needed.
    pub fn new<P>(public_dir: P) -> crate::Result<Self>
    where
        P: Into<PathBuf>,
    {
        let storage = Self { public_dir: public_dir.into() };

        let images_dir = storage.images_dir();
        fs::create_dir_all(&images_dir).with_storage_context(|| {
            format!("failed to create images directory {}", images_dir.display())
        })?;

        Ok(storage)
    }

    /// Public root directory.
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Directory where images are stored.
    pub fn images_dir(&self) -> PathBuf {
        self.public_dir.join(IMAGES_DIR)
    }

    /// Returns the full path of an image from its path relative to the public root.
    pub fn resolve(&self, relative_path: &str) -> PathBuf {
        self.public_dir.join(relative_path)
    }

    /// Moves an uploaded image to the images directory.
    ///
    /// The file is named `<unix-timestamp>.<extension>`. If that name is already taken, a suffix
    /// is added (`<unix-timestamp>_1.<extension>`, `<unix-timestamp>_2.<extension>`, etc.); an
    /// existing image is never overwritten.
    ///
    /// This performs blocking I/O; call it through [`web::block`](actix_web::web::block).
    pub fn store(&self, upload: ImageUpload) -> crate::Result<StoredImage> {
        self.store_with_timestamp(upload, Utc::now().timestamp())
    }

    fn store_with_timestamp(
        &self,
        upload: ImageUpload,
        timestamp: i64,
    ) -> crate::Result<StoredImage> {
        let ImageUpload { mut file, extension } = upload;
        let images_dir = self.images_dir();

        let mut attempt = 0;
        loop {
            let file_name = image_file_name(timestamp, attempt, &extension);
            let path = images_dir.join(&file_name);

            match file.persist_noclobber(&path) {
                Ok(_) => {
                    debug!("Moved uploaded image to {}", path.display());
                    return Ok(StoredImage::new(&file_name, path));
                },
                Err(err) if err.error.kind() == ErrorKind::AlreadyExists => file = err.file,
                Err(err) => {
                    // Usually means the temp dir is on another filesystem.
                    debug!("Could not move {} ({}), copying it", path.display(), err.error);
                    file = err.file;

                    match copy_new(file.path(), &path) {
                        Ok(()) => return Ok(StoredImage::new(&file_name, path)),
                        Err(err) if err.kind() == ErrorKind::AlreadyExists => (),
                        Err(err) => {
                            return Err(err.with_storage_context(|| {
                                format!("failed to store image at {}", path.display())
                            }));
                        },
                    }
                },
            }

            attempt += 1;
        }
    }

    /// Removes a stored image.
    ///
    /// This performs blocking I/O; call it through [`web::block`](actix_web::web::block).
    pub fn remove(&self, image: &StoredImage) -> crate::Result<()> {
        fs::remove_file(&image.path)
            .with_storage_context(|| format!("failed to remove image {}", image.path.display()))
    }
}

impl StoredImage {
    fn new(file_name: &str, path: PathBuf) -> Self {
        Self { relative_path: format!("{}/{}", IMAGES_DIR, file_name), path }
    }
}

fn image_file_name(timestamp: i64, attempt: u32, extension: &str) -> String {
    match attempt {
        0 => format!("{}.{}", timestamp, extension),
        attempt => format!("{}_{}.{}", timestamp, attempt, extension),
    }
}

/// Copies `from` to a new file at `to`, failing with [`AlreadyExists`](ErrorKind::AlreadyExists)
/// if `to` exists. A partially-written copy is removed.
fn copy_new(from: &Path, to: &Path) -> io::Result<()> {
    let mut source = fs::File::open(from)?;
    let mut destination = OpenOptions::new().write(true).create_new(true).open(to)?;

    io::copy(&mut source, &mut destination).map(|_| ()).map_err(|err| {
        if let Err(remove_err) = fs::remove_file(to) {
            warn!("Failed to remove partial copy {}: {}", to.display(), remove_err);
        }
        err
    })
}
