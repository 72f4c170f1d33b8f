use crate::negotiation::HealthState;
use crate::transport::{MediaTransport, TransportConfig, TransportEvent};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{IceCandidate, SdpKind, SessionDescription};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const STREAM_ID: &str = "tandem";

/// [`MediaTransport`] on top of a `webrtc` peer connection with one audio
/// (Opus) and one video (VP8) track.
///
/// The capture pipeline writes samples into [`audio_track`](Self::audio_track)
/// and [`video_track`](Self::video_track); the transport only wires them into
/// the connection.
pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    audio: Arc<TrackLocalStaticSample>,
    video: Arc<TrackLocalStaticSample>,
    senders: Mutex<Vec<Arc<RTCRtpSender>>>,
}

impl RtcTransport {
    /// Builds the peer connection. Local candidates and connection health are
    /// pushed into `event_tx` until the listeners are deregistered.
    pub async fn new(config: TransportConfig, event_tx: mpsc::Sender<TransportEvent>) -> Result<Self> {
        let mut media = MediaEngine::default();
        media.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media)?;

        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                    if let Some(health) = health_of(s) {
                        let _ = tx.send(TransportEvent::Health(health)).await;
                    }
                })
            },
        ));

        let ice_tx = event_tx;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::LocalCandidate(from_rtc_candidate(init)))
                    .await;
            })
        }));

        let audio = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            "audio".to_owned(),
            STREAM_ID.to_owned(),
        ));
        let video = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            "video".to_owned(),
            STREAM_ID.to_owned(),
        ));

        Ok(Self {
            peer_connection,
            audio,
            video,
            senders: Mutex::new(Vec::new()),
        })
    }

    pub fn audio_track(&self) -> Arc<TrackLocalStaticSample> {
        self.audio.clone()
    }

    pub fn video_track(&self) -> Arc<TrackLocalStaticSample> {
        self.video.clone()
    }
}

#[async_trait]
impl MediaTransport for RtcTransport {
    async fn attach_local_media(&self) -> Result<()> {
        let mut senders = self.senders.lock().await;
        if !senders.is_empty() {
            return Ok(());
        }

        let tracks: [Arc<dyn TrackLocal + Send + Sync>; 2] =
            [self.audio.clone(), self.video.clone()];
        for track in tracks {
            let sender = self
                .peer_connection
                .add_track(track)
                .await
                .context("Failed to add local track")?;
            senders.push(sender);
        }
        debug!("Attached {} local track(s)", senders.len());
        Ok(())
    }

    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescription> {
        let options = RTCOfferOptions {
            voice_activity_detection: false,
            ice_restart,
        };
        let offer = self.peer_connection.create_offer(Some(options)).await?;
        from_rtc_description(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc_description(answer)
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add remote ICE candidate")?;
        Ok(())
    }

    async fn stop_local_media(&self) {
        let senders: Vec<_> = self.senders.lock().await.drain(..).collect();
        for sender in senders {
            if let Err(e) = sender.stop().await {
                warn!("Failed to stop local track: {}", e);
            }
        }
    }

    fn deregister_listeners(&self) {
        self.peer_connection
            .on_peer_connection_state_change(Box::new(|_: RTCPeerConnectionState| {
                Box::pin(async {})
            }));
        self.peer_connection
            .on_ice_candidate(Box::new(|_: Option<RTCIceCandidate>| Box::pin(async {})));
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn health_of(state: RTCPeerConnectionState) -> Option<HealthState> {
    match state {
        RTCPeerConnectionState::New => Some(HealthState::New),
        RTCPeerConnectionState::Connecting => Some(HealthState::Connecting),
        RTCPeerConnectionState::Connected => Some(HealthState::Connected),
        RTCPeerConnectionState::Failed => Some(HealthState::Failed),
        RTCPeerConnectionState::Closed => Some(HealthState::Closed),
        // Transient; either recovers on its own or escalates to `Failed`.
        RTCPeerConnectionState::Disconnected | RTCPeerConnectionState::Unspecified => None,
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription> {
    let rtc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(rtc)
}

fn from_rtc_description(desc: RTCSessionDescription) -> Result<SessionDescription> {
    match desc.sdp_type {
        RTCSdpType::Offer => Ok(SessionDescription::offer(desc.sdp)),
        RTCSdpType::Answer => Ok(SessionDescription::answer(desc.sdp)),
        other => bail!("Unsupported session description type: {}", other),
    }
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}
