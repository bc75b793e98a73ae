//! The platform calls this client knows how to make.

use futures_util::Stream;
use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode, CONTROLS};
use reqwest::StatusCode;
use tracing::info;

use crate::{platform_path, ApiResponse, AssetLocation, Document, Gateway, NewAsset, Result};

/// Characters that would end or split a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn segment(value: &str) -> PercentEncode<'_> {
    utf8_percent_encode(value, SEGMENT)
}

/// Outcome of an asset creation.
#[derive(Debug, Clone)]
pub struct CreatedAsset {
    pub status: StatusCode,
    /// Id taken from the `Location` header, when the platform sent one.
    pub asset_id: Option<String>,
    pub response: ApiResponse,
}

impl Gateway {
    pub async fn user(&self, username: &str) -> Result<ApiResponse> {
        self.get(&format!("/users/{}", segment(username))).await
    }

    pub async fn organizations(&self, username: &str) -> Result<ApiResponse> {
        self.get(&format!("/users/{}/organizations", segment(username))).await
    }

    pub fn asset_types(&self) -> impl Stream<Item = Result<Document>> + '_ {
        self.pages("/assetCatalog")
    }

    pub async fn assets(&self, org_id: &str) -> Result<ApiResponse> {
        self.get(&format!("/organizations/{}/assets", segment(org_id))).await
    }

    pub async fn asset(&self, asset_id: &str) -> Result<ApiResponse> {
        self.get(&format!("/assets/{}", segment(asset_id))).await
    }

    pub async fn create_asset(&self, org_id: &str, asset: &NewAsset) -> Result<CreatedAsset> {
        info!(org_id, title = %asset.title, "creating asset");
        let response = self
            .post(&format!("/organizations/{}/assets", segment(org_id)), asset)
            .await?;
        let asset_id = response
            .location()
            .and_then(|location| platform_path(self.platform_root(), location).ok())
            .and_then(|path| path.strip_prefix("/assets/").map(str::to_string));

        Ok(CreatedAsset {
            status: response.status,
            asset_id,
            response,
        })
    }

    pub async fn create_asset_location(
        &self,
        asset_id: &str,
        location: &AssetLocation,
    ) -> Result<ApiResponse> {
        info!(asset_id, "creating asset location");
        self.post(
            &format!("/assets/{}/locations", segment(asset_id)),
            std::slice::from_ref(location),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_cannot_escape_their_segment() {
        assert_eq!(segment("294121a3").to_string(), "294121a3");
        assert_eq!(segment("@currentUser").to_string(), "@currentUser");
        assert_eq!(segment("x?y=1#frag").to_string(), "x%3Fy=1%23frag");
        assert_eq!(segment("../orgs/1").to_string(), "..%2Forgs%2F1");
        assert_eq!(segment("100%").to_string(), "100%25");
    }
}
