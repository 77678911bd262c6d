//! Shared test utilities used across tessera crates.

pub mod datasets {
    //! Deterministic synthetic datasets for clustering tests.
    //!
    //! Generation is fully seeded so fixtures are reproducible across
    //! processes and platforms.

    use rand::{Rng, SeedableRng, rngs::SmallRng};

    /// A generated dataset: flat row-major coordinates plus its shape.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Dataset {
        /// Row-major coordinate buffer, `dimensions` values per point.
        pub coords: Vec<f32>,
        /// Number of points.
        pub points: usize,
        /// Dimensionality of every point.
        pub dimensions: usize,
    }

    /// Draws `points_per_blob` points around each centre with isotropic
    /// Gaussian spread.
    ///
    /// Every centre must share the same dimensionality. Points are emitted
    /// blob by blob, so ground-truth membership is recoverable from the row
    /// index when a test needs it.
    ///
    /// # Panics
    /// Panics when `centers` is empty or the centres disagree on
    /// dimensionality; fixtures are hard-coded so this only fires on a
    /// broken test.
    ///
    /// # Examples
    /// ```
    /// use tessera_test_support::datasets::gaussian_blobs;
    ///
    /// let data = gaussian_blobs(&[vec![0.0, 0.0], vec![50.0, 50.0]], 10, 1.0, 42);
    /// assert_eq!(data.points, 20);
    /// assert_eq!(data.dimensions, 2);
    /// assert_eq!(data.coords.len(), 40);
    /// ```
    #[must_use]
    pub fn gaussian_blobs(
        centers: &[Vec<f32>],
        points_per_blob: usize,
        spread: f32,
        seed: u64,
    ) -> Dataset {
        let dimensions = centers
            .first()
            .expect("at least one blob centre is required")
            .len();
        assert!(
            centers.iter().all(|center| center.len() == dimensions),
            "blob centres must share one dimensionality"
        );

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut coords = Vec::with_capacity(centers.len() * points_per_blob * dimensions);
        for center in centers {
            for _ in 0..points_per_blob {
                for &base in center {
                    coords.push(base + standard_normal(&mut rng) * spread);
                }
            }
        }

        Dataset {
            coords,
            points: centers.len() * points_per_blob,
            dimensions,
        }
    }

    /// Draws points uniformly inside an axis-aligned box, useful as
    /// structureless background noise.
    ///
    /// # Examples
    /// ```
    /// use tessera_test_support::datasets::uniform_box;
    ///
    /// let data = uniform_box(&[(0.0, 10.0), (0.0, 10.0)], 25, 7);
    /// assert_eq!(data.points, 25);
    /// assert!(data.coords.iter().all(|&c| (0.0..=10.0).contains(&c)));
    /// ```
    #[must_use]
    pub fn uniform_box(bounds: &[(f32, f32)], points: usize, seed: u64) -> Dataset {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut coords = Vec::with_capacity(points * bounds.len());
        for _ in 0..points {
            for &(low, high) in bounds {
                coords.push(rng.gen_range(low..high));
            }
        }

        Dataset {
            coords,
            points,
            dimensions: bounds.len(),
        }
    }

    /// Samples a standard normal deviate via the Box-Muller transform.
    fn standard_normal(rng: &mut SmallRng) -> f32 {
        let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
        let u2: f32 = rng.gen_range(0.0..1.0);
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }
}

pub mod tracing {
    //! Recording layer utilities for capturing spans and events in tests.

    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::registry::LookupSpan;

    /// Recording layer installed during tests to capture spans and events
    /// for later assertions.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Returns a snapshot of the closed spans recorded by the layer in
        /// completion order.
        ///
        /// # Examples
        /// ```
        /// use tessera_test_support::tracing::RecordingLayer;
        ///
        /// let layer = RecordingLayer::default();
        /// assert!(layer.spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.spans.lock().expect("lock poisoned").clone()
        }

        /// Returns a snapshot of the emitted events recorded by the layer
        /// in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.events.lock().expect("lock poisoned").clone()
        }
    }

    /// Snapshot of a closed span: its name and recorded fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Name the span was created with.
        pub name: String,
        /// Field values recorded on the span, rendered as strings.
        pub fields: HashMap<String, String>,
    }

    /// Snapshot of an emitted event: its target and rendered fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Target module path of the event.
        pub target: String,
        /// Field values attached to the event, rendered as strings.
        pub fields: HashMap<String, String>,
    }

    #[derive(Default)]
    struct FieldVisitor {
        fields: HashMap<String, String>,
    }

    impl Visit for FieldVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .insert(field.name().to_owned(), format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.fields.insert(field.name().to_owned(), value.to_owned());
        }
    }

    struct SpanFields(HashMap<String, String>);

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            id: &tracing::span::Id,
            ctx: Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor::default();
            attrs.record(&mut visitor);
            if let Some(span) = ctx.span(id) {
                span.extensions_mut().insert(SpanFields(visitor.fields));
            }
        }

        fn on_record(
            &self,
            id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            ctx: Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor::default();
            values.record(&mut visitor);
            if let Some(span) = ctx.span(id) {
                if let Some(fields) = span.extensions_mut().get_mut::<SpanFields>() {
                    fields.0.extend(visitor.fields);
                }
            }
        }

        fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let fields = span
                .extensions()
                .get::<SpanFields>()
                .map(|fields| fields.0.clone())
                .unwrap_or_default();
            self.spans
                .lock()
                .expect("lock poisoned")
                .push(SpanRecord {
                    name: span.name().to_owned(),
                    fields,
                });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.events
                .lock()
                .expect("lock poisoned")
                .push(EventRecord {
                    target: event.metadata().target().to_owned(),
                    fields: visitor.fields,
                });
        }
    }
}
