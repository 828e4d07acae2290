//! Laptop gRPC service implementation
//!
//! Thin transport layer over `domain_laptops::LaptopService`: converts proto
//! messages with the From/TryFrom impls in `domain_laptops::conversions`,
//! turns the caller's `grpc-timeout` into a `CallContext`, and maps
//! `LaptopError` to `Status` on the way out.

use domain_laptops::{
    CallContext, Filter, ImageStore, ImageUnit, Laptop, LaptopError, LaptopResult, LaptopService,
    LaptopStore, RatingRequest, RatingStore,
};
use grpc_client::{ToTonicOption, ToTonicResult, request_timeout};
use rpc::laptop_service_server::LaptopService as LaptopServiceRpc;
use rpc::{
    CreateLaptopRequest, CreateLaptopResponse, RateLaptopRequest, RateLaptopResponse,
    SearchLaptopRequest, SearchLaptopResponse, UploadImageRequest, UploadImageResponse,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};
use tracing::{error, info};

/// Laptops buffered between the scan worker and the response stream
const SEARCH_BUFFER: usize = 16;

/// Rating replies are sent one at a time
const RATE_BUFFER: usize = 1;

type ResponseStream<T> = ReceiverStream<Result<T, Status>>;

/// gRPC service implementation for laptops
///
/// Generic over the three stores so tests and the server can pick backends.
pub struct LaptopServiceImpl<L, I, R> {
    service: LaptopService<L, I, R>,
}

impl<L, I, R> LaptopServiceImpl<L, I, R>
where
    L: LaptopStore + 'static,
    I: ImageStore + 'static,
    R: RatingStore + 'static,
{
    pub fn new(service: LaptopService<L, I, R>) -> Self {
        Self { service }
    }

    /// Consume upload messages; dropping the returned future cancels `ctx`
    async fn receive_image<S>(
        &self,
        ctx: CallContext,
        messages: S,
    ) -> Result<UploadImageResponse, Status>
    where
        S: Stream<Item = Result<UploadImageRequest, Status>> + Unpin + Send,
    {
        let _guard = ctx.drop_guard();

        let units = messages.map(|message| match message {
            Ok(message) => ImageUnit::try_from(message).map_err(LaptopError::InvalidArgument),
            Err(status) => Err(LaptopError::Unknown(format!(
                "cannot receive image data: {}",
                status.message()
            ))),
        });

        let upload = self.service.upload_image(&ctx, units).await?;
        Ok(upload.into())
    }
}

/// Call context carrying the caller's deadline, if one was sent
fn call_context<T>(request: &Request<T>) -> CallContext {
    CallContext::with_timeout(request_timeout(request.metadata()))
}

/// Scan on the blocking pool and stream the matches back
///
/// The scan holds a std lock and blocks on channel backpressure. `ctx` is
/// cancelled as soon as the receiving side is dropped.
fn spawn_search<L, I, R>(
    service: LaptopService<L, I, R>,
    ctx: CallContext,
    filter: Filter,
) -> ResponseStream<SearchLaptopResponse>
where
    L: LaptopStore + 'static,
    I: ImageStore + 'static,
    R: RatingStore + 'static,
{
    let (tx, rx) = mpsc::channel(SEARCH_BUFFER);

    let scan_ctx = ctx.clone();
    let results = tx.clone();
    let search = tokio::task::spawn_blocking(move || {
        service.search_laptops(&scan_ctx, &filter, |laptop| {
            results
                .blocking_send(Ok(SearchLaptopResponse {
                    laptop: Some(laptop.into()),
                }))
                .map_err(|_| LaptopError::Unknown("cannot send laptop to client".to_string()))
        })
    });

    tokio::spawn(async move {
        let outcome = tokio::select! {
            outcome = search => outcome,
            _ = tx.closed() => {
                // client went away; stop the scan at its next step
                ctx.cancel();
                return;
            }
        };

        let status = match outcome {
            Ok(Ok(_)) => return,
            Ok(Err(err)) => Status::from(err),
            Err(join_error) => {
                error!(error = %join_error, "Search worker failed");
                Status::internal("search worker failed")
            }
        };
        let _ = tx.send(Err(status)).await;
    });

    ReceiverStream::new(rx)
}

/// Rate each inbound request and stream one summary back per request
///
/// `ctx` is cancelled as soon as the receiving side is dropped.
fn spawn_rating<L, I, R, S>(
    service: LaptopService<L, I, R>,
    ctx: CallContext,
    inbound: S,
) -> ResponseStream<RateLaptopResponse>
where
    L: LaptopStore + 'static,
    I: ImageStore + 'static,
    R: RatingStore + 'static,
    S: Stream<Item = LaptopResult<RatingRequest>> + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(RATE_BUFFER);

    tokio::spawn(async move {
        let replies = tx.clone();
        let rating = service.rate_laptops(&ctx, inbound, move |summary| {
            let replies = replies.clone();
            async move {
                replies
                    .send(Ok(RateLaptopResponse::from(summary)))
                    .await
                    .map_err(|_| LaptopError::Unknown("cannot send stream response".to_string()))
            }
        });

        let result = tokio::select! {
            result = rating => result,
            _ = tx.closed() => {
                ctx.cancel();
                return;
            }
        };

        if let Err(err) = result {
            let _ = tx.send(Err(Status::from(err))).await;
        }
    });

    ReceiverStream::new(rx)
}

#[tonic::async_trait]
impl<L, I, R> LaptopServiceRpc for LaptopServiceImpl<L, I, R>
where
    L: LaptopStore + 'static,
    I: ImageStore + 'static,
    R: RatingStore + 'static,
{
    async fn create_laptop(
        &self,
        request: Request<CreateLaptopRequest>,
    ) -> Result<Response<CreateLaptopResponse>, Status> {
        let ctx = call_context(&request);
        let _guard = ctx.drop_guard();

        let laptop = request
            .into_inner()
            .laptop
            .ok_or_invalid("laptop is required")?;
        info!(laptop_id = %laptop.id, "Receive a create-laptop request");

        let laptop: Laptop = laptop.try_into().to_tonic()?;
        let id = self.service.create_laptop(&ctx, laptop)?;
        Ok(Response::new(CreateLaptopResponse { id }))
    }

    type SearchLaptopStream = ResponseStream<SearchLaptopResponse>;

    async fn search_laptop(
        &self,
        request: Request<SearchLaptopRequest>,
    ) -> Result<Response<Self::SearchLaptopStream>, Status> {
        let ctx = call_context(&request);
        let filter: Filter = request
            .into_inner()
            .filter
            .ok_or_invalid("filter is required")?
            .try_into()
            .to_tonic()?;
        info!(?filter, "Receive a search-laptop request");

        Ok(Response::new(spawn_search(self.service.clone(), ctx, filter)))
    }

    async fn upload_image(
        &self,
        request: Request<Streaming<UploadImageRequest>>,
    ) -> Result<Response<UploadImageResponse>, Status> {
        let ctx = call_context(&request);
        let response = self.receive_image(ctx, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    type RateLaptopStream = ResponseStream<RateLaptopResponse>;

    async fn rate_laptop(
        &self,
        request: Request<Streaming<RateLaptopRequest>>,
    ) -> Result<Response<Self::RateLaptopStream>, Status> {
        let ctx = call_context(&request);

        let inbound = request.into_inner().map(|message| {
            message.map(RatingRequest::from).map_err(|status| {
                LaptopError::Unknown(format!("cannot receive stream request: {}", status.message()))
            })
        });

        Ok(Response::new(spawn_rating(self.service.clone(), ctx, inbound)))
    }
}
