use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yt_data_client::{
    ApiError, NewPlaylist, NewPlaylistItem, PlaylistSnippet, PlaylistStatus, PrivacyStatus,
    YouTubeDataClient,
};

fn client_for(server: &MockServer, api_key: Option<&str>) -> YouTubeDataClient {
    YouTubeDataClient::new(server.uri(), "token-abc", api_key.map(str::to_string))
}

#[tokio::test]
async fn list_playlist_items_sends_paging_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("part", "contentDetails,snippet"))
        .and(query_param("playlistId", "PL123"))
        .and(query_param("pageToken", ""))
        .and(query_param("maxResults", "50"))
        .and(query_param("key", "dev-key"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "NEXT",
            "pageInfo": { "totalResults": 2, "resultsPerPage": 50 },
            "items": [
                {
                    "id": "item-1",
                    "snippet": { "channelTitle": "MyMix", "title": "first" },
                    "contentDetails": { "videoId": "A" }
                },
                {
                    "id": "item-2",
                    "snippet": { "channelTitle": "MyMix", "title": "second" },
                    "contentDetails": { "videoId": "B" }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server, Some("dev-key"))
        .list_playlist_items("PL123", "")
        .await
        .unwrap();

    assert_eq!(page.next_page_token.as_deref(), Some("NEXT"));
    let ids: Vec<_> = page.items.iter().filter_map(|i| i.video_id()).collect();
    assert_eq!(ids, ["A", "B"]);
    assert_eq!(page.items[0].channel_title(), Some("MyMix"));
}

#[tokio::test]
async fn api_key_is_omitted_when_not_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let page = client_for(&server, None)
        .list_playlist_items("PL123", "")
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_page_token.is_none());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(k, _)| k != "key"));
}

#[tokio::test]
async fn insert_playlist_posts_snippet_and_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtube/v3/playlists"))
        .and(query_param("part", "snippet,status"))
        .and(body_json(json!({
            "snippet": {
                "title": "MyMix-Copy",
                "description": "Copied MyMix",
                "tags": ["sample playlist", "API call", "MUSIC"],
                "defaultLanguage": "en"
            },
            "status": { "privacyStatus": "private" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "youtube#playlist",
            "id": "PLnew",
            "snippet": { "title": "MyMix-Copy" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let playlist = NewPlaylist {
        snippet: PlaylistSnippet {
            title: "MyMix-Copy".to_string(),
            description: "Copied MyMix".to_string(),
            tags: vec![
                "sample playlist".to_string(),
                "API call".to_string(),
                "MUSIC".to_string(),
            ],
            default_language: Some("en".to_string()),
        },
        status: PlaylistStatus {
            privacy_status: PrivacyStatus::Private,
        },
    };

    let created = client_for(&server, None)
        .insert_playlist(&playlist)
        .await
        .unwrap();
    assert_eq!(created.id, "PLnew");
}

#[tokio::test]
async fn insert_playlist_item_references_video_resource() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("part", "snippet"))
        .and(body_json(json!({
            "snippet": {
                "playlistId": "PLnew",
                "position": 0,
                "resourceId": { "kind": "youtube#video", "videoId": "A" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "item-x",
            "snippet": { "playlistId": "PLnew", "position": 0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let inserted = client_for(&server, None)
        .insert_playlist_item(&NewPlaylistItem::video("PLnew", "A", 0))
        .await
        .unwrap();
    assert_eq!(inserted.id.as_deref(), Some("item-x"));
}

#[tokio::test]
async fn error_status_surfaces_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .insert_playlist_item(&NewPlaylistItem::video("PLnew", "A", 0))
        .await
        .unwrap_err();

    match err {
        ApiError::Status {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, "playlistItems.insert");
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "quotaExceeded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtube/v3/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"kind\": \"youtube#playlist\"}"))
        .mount(&server)
        .await;

    let playlist = NewPlaylist {
        snippet: PlaylistSnippet {
            title: "t".to_string(),
            description: String::new(),
            tags: Vec::new(),
            default_language: None,
        },
        status: PlaylistStatus {
            privacy_status: PrivacyStatus::Private,
        },
    };

    let err = client_for(&server, None)
        .insert_playlist(&playlist)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { endpoint: "playlists.insert", .. }));
}

#[test]
fn trailing_slash_is_trimmed_from_base_url() {
    let client = YouTubeDataClient::new("http://localhost:9000/", "t", None);
    assert_eq!(client.base_url(), "http://localhost:9000");
}
