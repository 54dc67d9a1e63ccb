mod api;
mod components;

use components::header::render_header;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use shared::AnalysisResponse;
use wasm_bindgen_futures::spawn_local;
use web_sys::File;
use yew::prelude::*;

const DETECTION_FAILED: &str = "Detection failed. Please try another file.";

pub enum Msg {
    FileSelected(Option<File>),
    Analyze,
    AnalysisDone(AnalysisResponse),
    AnalysisFailed(String),
}

pub struct Model {
    file: Option<File>,
    result: Option<AnalysisResponse>,
    loading: bool,
    error: Option<String>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            file: None,
            result: None,
            loading: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileSelected(file) => {
                self.file = file;
                true
            }
            Msg::Analyze => self.handle_analyze(ctx),
            Msg::AnalysisDone(response) => {
                self.loading = false;
                self.result = Some(response);
                true
            }
            Msg::AnalysisFailed(reason) => {
                log::error!("Analysis request failed: {}", reason);
                self.loading = false;
                self.error = Some(DETECTION_FAILED.to_string());
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container" style="padding: 40px; font-family: Arial;">
                { render_header() }
                { render_upload_section(self, ctx) }
                <br />
                { render_error_message(self) }
                { render_results(self) }
            </div>
        }
    }
}

impl Model {
    fn handle_analyze(&mut self, ctx: &Context<Self>) -> bool {
        let Some(file) = self.file.clone() else {
            return false;
        };

        self.loading = true;
        self.error = None;
        self.result = None;

        let link = ctx.link().clone();
        spawn_local(async move {
            match api::analyze_file(&file).await {
                Ok(response) => link.send_message(Msg::AnalysisDone(response)),
                Err(e) => link.send_message(Msg::AnalysisFailed(e)),
            }
        });

        true
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<Model>::new().render();
}
