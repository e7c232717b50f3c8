//! Image, model, and texture uploads plus helpers for locating uploaded files.

// std
use std::{fs, path::Path};
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	error::UploadError,
	http::{ApiHttpClient, FilePart, Method},
};

const FILE_FIELD: &str = "file";
const UPLOADS_PREFIX: &str = "uploads/";

/// File payload sent as the `file` part of an upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
	file_name: String,
	mime: String,
	data: Arc<[u8]>,
}
impl UploadFile {
	/// Wraps in-memory contents; the MIME type is guessed from `file_name`.
	pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
		let file_name = file_name.into();
		let mime =
			mime_guess::from_path(&file_name).first_or_octet_stream().essence_str().to_owned();

		Self { file_name, mime, data: Arc::from(data.into()) }
	}

	/// Reads a local file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
		let path = path.as_ref();
		let data = fs::read(path)
			.map_err(|source| UploadError::Read { path: path.display().to_string(), source })?;
		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| FILE_FIELD.to_owned());

		Ok(Self::new(file_name, data))
	}

	/// Overrides the guessed MIME type.
	pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
		self.mime = mime.into();

		self
	}

	/// File name reported to the server.
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// MIME type sent with the part.
	pub fn mime(&self) -> &str {
		&self.mime
	}

	/// Payload size in bytes.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Returns `true` for empty payloads.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	fn into_part(self) -> FilePart {
		FilePart {
			field: FILE_FIELD.into(),
			file_name: self.file_name,
			mime: self.mime,
			data: self.data,
		}
	}
}
impl Debug for UploadFile {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UploadFile")
			.field("file_name", &self.file_name)
			.field("mime", &self.mime)
			.field("len", &self.data.len())
			.finish()
	}
}

/// `/upload/` endpoints.
pub struct Uploads<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	client: &'a ApiClient<C>,
}
impl<'a, C> Uploads<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) fn new(client: &'a ApiClient<C>) -> Self {
		Self { client }
	}

	/// Uploads an image into `category` (for example `projects`, `profile`, `certificates`).
	pub async fn image<T>(&self, file: UploadFile, category: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.upload("upload/image", Some(category), file).await
	}

	/// Uploads a 3D model (GLB, GLTF, FBX, OBJ).
	pub async fn model<T>(&self, file: UploadFile) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.upload("upload/model", None, file).await
	}

	/// Uploads a texture (JPG, PNG, EXR, HDR).
	pub async fn texture<T>(&self, file: UploadFile) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.upload("upload/texture", None, file).await
	}

	/// Deletes an uploaded file given its relative upload path or public URL.
	pub async fn delete_file<T>(&self, path_or_url: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let file_path = relative_upload_path(path_or_url)
			.ok_or_else(|| UploadError::InvalidFilePath { input: path_or_url.to_owned() })?;
		let request = self
			.client
			.request(Method::Delete, "upload/file")?
			.with_query([("file_path", file_path)]);

		self.client.send_json(request).await
	}

	/// Public URL of an uploaded file; absolute URLs are returned unchanged.
	pub fn file_url(&self, path: &str) -> Option<String> {
		file_url(&self.client.config().uploads_url, path)
	}

	async fn upload<T>(&self, path: &str, category: Option<&str>, file: UploadFile) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = self
			.client
			.request(Method::Post, path)?
			.with_query(category.map(|category| ("category", category)))
			.with_multipart(vec![file.into_part()]);

		self.client.send_json(request).await
	}
}

/// Joins `path` beneath `uploads_url`; empty paths yield `None`, `http*` paths pass through.
pub fn file_url(uploads_url: &Url, path: &str) -> Option<String> {
	if path.is_empty() {
		return None;
	}
	if path.starts_with("http") {
		return Some(path.to_owned());
	}

	Some(format!("{}/{path}", uploads_url.as_str().trim_end_matches('/')))
}

/// Normalizes a stored upload reference to the path the delete endpoint expects.
///
/// Absolute http(s) URLs are reduced to their path, leading slashes and one `uploads/`
/// prefix are removed. Blank input and unparseable URLs yield `None`.
pub fn relative_upload_path(value: &str) -> Option<String> {
	let value = value.trim();
	let path = if value.starts_with("http://") || value.starts_with("https://") {
		Url::parse(value).ok()?.path().to_owned()
	} else {
		value.to_owned()
	};
	let path = path.trim_start_matches('/');
	let path = path.strip_prefix(UPLOADS_PREFIX).unwrap_or(path);

	(!path.is_empty()).then(|| path.to_owned())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn relative_path_strips_origin_and_prefix() {
		assert_eq!(
			relative_upload_path("https://cdn.example.com/uploads/projects/hero.png").as_deref(),
			Some("projects/hero.png")
		);
		assert_eq!(
			relative_upload_path("  //uploads/models/ship.glb ").as_deref(),
			Some("models/ship.glb")
		);
		assert_eq!(relative_upload_path("textures/sky.hdr").as_deref(), Some("textures/sky.hdr"));
		assert_eq!(
			relative_upload_path("uploads/uploads/nested.png").as_deref(),
			Some("uploads/nested.png")
		);
	}

	#[test]
	fn relative_path_rejects_blank_and_broken_input() {
		assert_eq!(relative_upload_path("   "), None);
		assert_eq!(relative_upload_path("/uploads/"), None);
		assert_eq!(relative_upload_path("http://[::1"), None);
	}

	#[test]
	fn file_url_joins_beneath_uploads() {
		let uploads =
			Url::parse("http://localhost:8006/uploads").expect("Uploads URL should parse.");

		assert_eq!(file_url(&uploads, ""), None);
		assert_eq!(
			file_url(&uploads, "projects/a.png").as_deref(),
			Some("http://localhost:8006/uploads/projects/a.png")
		);
		assert_eq!(
			file_url(&uploads, "https://cdn.example.com/a.png").as_deref(),
			Some("https://cdn.example.com/a.png")
		);
	}

	#[test]
	fn upload_file_guesses_mime() {
		assert_eq!(UploadFile::new("hero.png", vec![1, 2]).mime(), "image/png");
		assert_eq!(UploadFile::new("blob", Vec::new()).mime(), "application/octet-stream");
		assert_eq!(
			UploadFile::new("ship.glb", vec![0]).with_mime("model/gltf-binary").mime(),
			"model/gltf-binary"
		);
	}
}
