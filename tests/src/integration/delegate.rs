//! # Model Delegate Flows
//!
//! A worker-side [`ModelDelegateClient`] talks to the master's delegate
//! handler. The wire transport below pushes every request and response
//! through their bincode encodings, as the HTTP route does.

use async_trait::async_trait;
use shared_types::{Request, Response};
use std::sync::Arc;
use tc_03_model_delegate::{DelegateError, DelegateTransport, ModelDelegateHandler};

/// Transport that serializes both directions before handing over.
pub struct WireTransport {
    handler: Arc<ModelDelegateHandler>,
}

impl WireTransport {
    pub fn new(handler: Arc<ModelDelegateHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl DelegateTransport for WireTransport {
    async fn call(&self, request: Request) -> Result<Response, DelegateError> {
        let request = Request::from_bytes(&request.to_bytes()?)?;
        let response = self.handler.do_request(&request).await;
        Ok(Response::from_bytes(&response.to_bytes()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_store::ModelStore;
    use shared_types::{ErrorCode, ErrorCoded, Model, ModelKind, ObjectId, Project, Spider};
    use tc_03_model_delegate::ModelDelegateClient;

    use crate::integration::fixtures::container;

    fn client(c: &master_runtime::SubsystemContainer) -> ModelDelegateClient {
        let transport = Arc::new(WireTransport::new(Arc::clone(&c.delegate_handler)));
        ModelDelegateClient::new(transport, "w1")
    }

    #[tokio::test]
    async fn test_remote_add_lands_in_master_store() {
        let c = container();
        let client = client(&c);

        let project = Project::try_from(
            client
                .add(&Model::from(Project {
                    name: "news".into(),
                    ..Default::default()
                }))
                .await
                .unwrap(),
        )
        .unwrap();
        let id = project.id.unwrap();

        let spider = Spider {
            name: "headlines".into(),
            project_id: Some(id),
            ..Default::default()
        };
        let spider = Spider::try_from(client.add(&spider.into()).await.unwrap()).unwrap();

        let stored = Spider::try_from(
            c.store
                .get_by_id(ModelKind::Spider, spider.id.unwrap())
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(stored.project_id, Some(id));
        assert_eq!(stored.name, "headlines");
    }

    #[tokio::test]
    async fn test_save_delete_refresh_cycle() {
        let c = container();
        let client = client(&c);

        let added = client.add(&Spider::default().into()).await.unwrap();
        let mut spider = Spider::try_from(added).unwrap();
        spider.cmd = "scrapy crawl headlines".into();
        client.save(&spider.clone().into()).await.unwrap();

        let artifact = client.get_artifact(&spider.clone().into()).await.unwrap();
        assert_eq!(artifact.col, "spiders");
        assert!(!artifact.deleted);
        assert!(artifact.update_ts.is_some());

        let echoed = client.delete(&spider.clone().into()).await.unwrap();
        assert_eq!(Spider::try_from(echoed).unwrap().cmd, "scrapy crawl headlines");

        let err = client.refresh(&spider.into()).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_unknown_model_rejected_over_the_wire() {
        let c = container();
        let transport = WireTransport::new(Arc::clone(&c.delegate_handler));
        let msg = shared_types::DelegateMessage {
            model_id: 0,
            method: shared_types::DelegateMethod::Add as i32,
            data: b"{}".to_vec(),
        };
        let response = transport
            .call(Request::new("w1", msg.to_bytes().unwrap()))
            .await
            .unwrap();
        assert_eq!(response.error_code(), Some(ErrorCode::InvalidModelType));
    }

    #[tokio::test]
    async fn test_refresh_unknown_identity() {
        let c = container();
        let client = client(&c);
        let ghost = Model::identity(ModelKind::Project, ObjectId::new());
        let err = client.refresh(&ghost).await.unwrap_err();
        assert!(matches!(err, DelegateError::Remote { code: Some(ErrorCode::NotFound), .. }));
    }
}
